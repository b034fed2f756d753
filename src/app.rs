use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use eframe::egui;

use strain_viewer::config::FormatConfig;
use strain_viewer::playback::TickOutcome;
use strain_viewer::state::{Session, ViewTarget};

use crate::ui::{dialogs, panels, plot};

// ---------------------------------------------------------------------------
// UI-only state
// ---------------------------------------------------------------------------

/// Text fields and pending requests that only the widgets care about.
#[derive(Default)]
pub struct UiState {
    pub range_dialog_open: bool,
    pub range_start: String,
    pub range_end: String,
    pub range_error: Option<String>,

    pub y_min: String,
    pub y_max: String,

    pub show_points: bool,

    /// Destination for a screenshot requested this frame.
    pub pending_screenshot: Option<PathBuf>,

    /// Next due tick per playing view.
    pub next_tick: HashMap<ViewTarget, Instant>,
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StrainViewerApp {
    pub session: Session,
    pub ui: UiState,
}

impl StrainViewerApp {
    pub fn new(format: FormatConfig) -> Self {
        Self {
            session: Session::new(format),
            ui: UiState::default(),
        }
    }

    /// Cooperative playback scheduling: each playing view advances when its
    /// delay has elapsed, then asks for a repaint at the next due time.
    fn drive_playback(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let mut targets = vec![ViewTarget::Main];
        targets.extend(self.session.ranges.iter().map(|r| ViewTarget::Range(r.id)));

        for target in targets {
            let Some(view) = self.session.view_mut(target) else {
                self.ui.next_tick.remove(&target);
                continue;
            };
            if !view.playback.is_running() {
                self.ui.next_tick.remove(&target);
                continue;
            }
            let delay = view.playback.next_delay();
            let due = *self.ui.next_tick.entry(target).or_insert(now + delay);
            if now >= due {
                if view.tick() == TickOutcome::Stopped {
                    self.ui.next_tick.remove(&target);
                    continue;
                }
                let delay = view.playback.next_delay();
                self.ui.next_tick.insert(target, now + delay);
                ctx.request_repaint_after(delay);
            } else {
                ctx.request_repaint_after(due - now);
            }
        }
    }

    fn handle_screenshot(&mut self, ctx: &egui::Context) {
        let Some(path) = self.ui.pending_screenshot.clone() else {
            return;
        };
        let image = ctx.input(|i| {
            i.raw.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        if let Some(image) = image {
            self.ui.pending_screenshot = None;
            match dialogs::save_color_image(&path, &image) {
                Ok(()) => {
                    log::info!("Plot saved to {}", path.display());
                    self.session.status_message = Some(format!("Plot saved to {}", path.display()));
                }
                Err(e) => {
                    log::error!("Failed to save image: {e:#}");
                    self.session.status_message = Some(format!("Error: {e:#}"));
                }
            }
        }
    }
}

impl eframe::App for StrainViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_screenshot(ctx);
        self.drive_playback(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session, &mut self.ui);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session, &mut self.ui);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::main_plot(ui, &self.session);
        });

        // ---- Floating windows ----
        panels::range_dialog(ctx, &mut self.session, &mut self.ui);
        panels::range_windows(ctx, &mut self.session, &mut self.ui);
        panels::points_window(ctx, &mut self.session, &mut self.ui);
    }
}
