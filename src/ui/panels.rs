use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use strain_viewer::playback::Direction;
use strain_viewer::state::{Session, TimelineView, ViewTarget, YBounds};

use crate::app::UiState;

use super::{dialogs, plot};

/// A button press that needs more than the view itself to complete.
enum ViewRequest {
    Export,
    SaveImage,
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, session: &mut Session, ui_state: &mut UiState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                dialogs::open_measurement_dialog(session, ui_state);
                ui.close_menu();
            }
            if ui.button("Load points CSV…").clicked() {
                dialogs::open_points_dialog(session, ui_state);
                ui.close_menu();
            }
            ui.separator();
            let loaded = session.main.is_some();
            if ui.add_enabled(loaded, egui::Button::new("Export data…")).clicked() {
                dialogs::export_dialog(session, ViewTarget::Main);
                ui.close_menu();
            }
            if ui.add_enabled(loaded, egui::Button::new("Save image…")).clicked() {
                dialogs::save_image_dialog(ui.ctx(), ui_state);
                ui.close_menu();
            }
        });

        if ui.button("Add range…").clicked() {
            if session.main.is_some() {
                ui_state.range_dialog_open = true;
                ui_state.range_error = None;
            } else {
                session.status_message = Some("Error: no data loaded to add a range.".into());
            }
        }

        ui.separator();

        if let Some(ds) = &session.dataset {
            ui.label(format!(
                "{} timestamps × {} distances, {} range window(s)",
                ds.len(),
                ds.width(),
                session.ranges.len()
            ));
        }

        if let Some(msg) = &session.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – controls for the main plot
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, session: &mut Session, ui_state: &mut UiState) {
    ui.heading("Controls");
    ui.separator();

    if session.main.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            tare_selector(ui, session);
            ui.separator();

            let Session {
                dataset, main, ..
            } = &mut *session;
            let (Some(dataset), Some(view)) = (dataset.as_ref(), main.as_mut()) else {
                return;
            };

            let request = view_controls(ui, view, &dataset.timestamps, true);
            ui.separator();
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("◀").clicked() {
                    view.shift(-1);
                }
                if ui.button("▶").clicked() {
                    view.shift(1);
                }
            });

            match request {
                Some(ViewRequest::Export) => dialogs::export_dialog(session, ViewTarget::Main),
                Some(ViewRequest::SaveImage) => dialogs::save_image_dialog(ui.ctx(), ui_state),
                None => {}
            }

            ui.separator();
            ui.strong("Statistics");
            for line in session.stats_lines(ViewTarget::Main) {
                ui.label(line);
            }

            ui.separator();
            y_axis_controls(ui, session, ui_state);

            ui.separator();
            if let Some(ds) = &session.dataset {
                egui::CollapsingHeader::new(RichText::new("File preview").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.label(RichText::new(ds.preview.join("\n")).monospace().small());
                    });
            }
        });
}

fn tare_selector(ui: &mut Ui, session: &mut Session) {
    let labels = session.tare_labels();
    if labels.is_empty() {
        ui.label("No tare rows found.");
        return;
    }
    let active = session
        .main
        .as_ref()
        .and_then(|v| v.pipeline.active_tare())
        .unwrap_or(0);
    let mut chosen = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Tare");
        egui::ComboBox::from_id_salt("tare_select")
            .selected_text(labels.get(active).cloned().unwrap_or_default())
            .show_ui(ui, |ui: &mut Ui| {
                for (i, label) in labels.iter().enumerate() {
                    if ui.selectable_label(i == active, label).clicked() {
                        chosen = Some(i);
                    }
                }
            });
    });
    if let Some(i) = chosen {
        if let Err(e) = session.select_tare(i) {
            session.status_message = Some(format!("Error: {e}"));
        }
    }
}

fn y_axis_controls(ui: &mut Ui, session: &mut Session, ui_state: &mut UiState) {
    ui.strong("Y-axis limits");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Min");
        ui.add(egui::TextEdit::singleline(&mut ui_state.y_min).desired_width(60.0));
        ui.label("Max");
        ui.add(egui::TextEdit::singleline(&mut ui_state.y_max).desired_width(60.0));
    });
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Apply").clicked() {
            session.y_bounds = YBounds {
                min: ui_state.y_min.trim().parse().ok(),
                max: ui_state.y_max.trim().parse().ok(),
            };
        }
        if ui.button("Reset Y").clicked() {
            ui_state.y_min.clear();
            ui_state.y_max.clear();
            session.y_bounds = YBounds::default();
        }
    });
}

// ---------------------------------------------------------------------------
// Shared per-view controls
// ---------------------------------------------------------------------------

/// Transform, lock and playback buttons plus the timestamp slider.
///
/// `clears_locks` makes Reset also drop locked curves (main window only).
fn view_controls(
    ui: &mut Ui,
    view: &mut TimelineView,
    timestamps: &[String],
    clears_locks: bool,
) -> Option<ViewRequest> {
    let mut request = None;

    ui.horizontal_wrapped(|ui: &mut Ui| {
        let zero_text = if view.pipeline.zeroing_enabled() {
            "Zeroing: on"
        } else {
            "Zeroing: off"
        };
        if ui
            .add_enabled(view.pipeline.has_tare(), egui::Button::new(zero_text))
            .clicked()
        {
            view.pipeline.toggle_zeroing();
        }
        if ui.button("Zero from timestamp").clicked() {
            if let Err(e) = view.zero_from_current() {
                log::error!("{e}");
            }
        }
        if ui.button("Lock Line").clicked() {
            view.lock_current(timestamps);
        }
        if ui.button("Reset").clicked() {
            if clears_locks {
                view.locked.clear();
            }
            view.pipeline.reset();
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("⏪").clicked() {
            view.playback.reverse();
        }
        let play_text = if view.playback.is_running() { "⏸" } else { "⏵" };
        if ui.button(play_text).clicked() {
            view.playback.toggle();
        }
        if ui.button("⏩").clicked() {
            view.playback.fast_forward();
        }
        let arrow = match view.playback.direction() {
            Direction::Forward => "→",
            Direction::Reverse => "←",
        };
        ui.label(format!("{arrow} ×{}", view.playback.speed()));
    });

    let mut idx = view.cursor();
    let max = view.len().saturating_sub(1);
    if ui
        .add(egui::Slider::new(&mut idx, 0..=max).text("Timestamp Index"))
        .changed()
    {
        view.set_cursor(idx);
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Export data…").clicked() {
            request = Some(ViewRequest::Export);
        }
        if ui.button("Save image…").clicked() {
            request = Some(ViewRequest::SaveImage);
        }
    });

    request
}

// ---------------------------------------------------------------------------
// Range selection
// ---------------------------------------------------------------------------

pub fn range_dialog(ctx: &egui::Context, session: &mut Session, ui_state: &mut UiState) {
    if !ui_state.range_dialog_open {
        return;
    }
    let mut open = true;
    let mut confirmed = false;
    egui::Window::new("Select Range")
        .open(&mut open)
        .collapsible(false)
        .show(ctx, |ui: &mut Ui| {
            ui.label("Enter start and end of the range (in meters):");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Start:");
                ui.text_edit_singleline(&mut ui_state.range_start);
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("End:");
                ui.text_edit_singleline(&mut ui_state.range_end);
            });
            if let Some(err) = &ui_state.range_error {
                ui.label(RichText::new(err).color(Color32::RED));
            }
            confirmed = ui.button("Confirm").clicked();
        });

    if confirmed {
        let parsed = (
            ui_state.range_start.trim().parse::<f64>(),
            ui_state.range_end.trim().parse::<f64>(),
        );
        match parsed {
            (Ok(start), Ok(end)) => match session.add_range(start, end) {
                Ok(_) => {
                    ui_state.range_dialog_open = false;
                    ui_state.range_error = None;
                }
                Err(e) => ui_state.range_error = Some(format!("Invalid range: {e}")),
            },
            _ => ui_state.range_error = Some("Invalid range: start and end must be numbers".into()),
        }
    }
    if !open {
        ui_state.range_dialog_open = false;
    }
}

/// One floating window per range view, each with its own controls.
pub fn range_windows(ctx: &egui::Context, session: &mut Session, ui_state: &mut UiState) {
    let mut requests = Vec::new();
    {
        let Session {
            dataset, ranges, ..
        } = &mut *session;
        let timestamps = dataset.as_ref().map(|d| d.timestamps.as_slice()).unwrap_or(&[]);

        for range in ranges.iter_mut() {
            let title = range.title();
            let id = range.id;
            let view = &mut range.view;
            egui::Window::new(title.as_str())
                .id(egui::Id::new(("range_window", id)))
                .open(&mut range.open)
                .default_size([700.0, 450.0])
                .show(ctx, |ui: &mut Ui| {
                    if let Some(req) = view_controls(ui, view, timestamps, false) {
                        requests.push((id, req));
                    }
                    let frame = view.frame(title.clone(), timestamps, YBounds::default());
                    plot::deformation_plot(ui, &format!("range_plot_{id}"), &frame, false);
                });
        }
    }
    session.prune_ranges();

    for (id, req) in requests {
        match req {
            ViewRequest::Export => dialogs::export_dialog(session, ViewTarget::Range(id)),
            ViewRequest::SaveImage => dialogs::save_image_dialog(ctx, ui_state),
        }
    }
}

// ---------------------------------------------------------------------------
// Point overlay window
// ---------------------------------------------------------------------------

pub fn points_window(ctx: &egui::Context, session: &mut Session, ui_state: &mut UiState) {
    if !ui_state.show_points {
        return;
    }
    let Some(overlay) = session.overlay() else {
        return;
    };
    let cursor = session.main.as_ref().map_or(0, |v| v.cursor());
    let mut step = 0;
    egui::Window::new("Point Plot")
        .open(&mut ui_state.show_points)
        .default_size([600.0, 450.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(format!("Point Plot at Timestamp Index {cursor}"));
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Previous").clicked() {
                    step = -1;
                }
                if ui.button("Next").clicked() {
                    step = 1;
                }
            });
            plot::points_plot(ui, &overlay);
        });
    if step != 0 {
        if let Some(view) = session.main.as_mut() {
            view.shift(step);
        }
    }
}
