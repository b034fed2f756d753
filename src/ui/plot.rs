use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Text};

use strain_viewer::color::{lock_color, ValueColorMap};
use strain_viewer::data::points::OverlayPoint;
use strain_viewer::state::{PlotFrame, Session, YBounds};

/// Hover readout radius, in plot units.
const HOVER_TOLERANCE: f64 = 0.1;

// ---------------------------------------------------------------------------
// Deformation plot (central panel)
// ---------------------------------------------------------------------------

pub fn main_plot(ui: &mut Ui, session: &Session) {
    let Some(view) = &session.main else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a measurement file to view deformation  (File → Open…)");
        });
        return;
    };

    let timestamps = session.timestamps();
    let title = format!(
        "Deformation Plot for Timestamp: {}",
        timestamps.get(view.cursor()).map_or("", String::as_str)
    );
    let frame = view.frame(title, timestamps, session.y_bounds);
    deformation_plot(ui, "main_plot", &frame, session.y_bounds != YBounds::default());
}

/// Draw locked curves (dashed) under the current curve.
///
/// With `fix_bounds` the view is pinned to the frame's resolved y-range and
/// the data's x-extent; otherwise the plot auto-fits and stays zoomable.
pub fn deformation_plot(ui: &mut Ui, id: &str, frame: &PlotFrame, fix_bounds: bool) {
    ui.label(frame.title.as_str());

    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Distance (m)")
        .y_axis_label("Deformation (microstrain)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for locked in &frame.locked {
                let points: PlotPoints = locked
                    .distances
                    .iter()
                    .zip(&locked.values)
                    .map(|(&d, &v)| [d, v])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&locked.label)
                        .color(lock_color(locked.color))
                        .style(LineStyle::dashed_loose())
                        .width(1.5),
                );
            }

            let current = &frame.current;
            let points: PlotPoints = current
                .distances
                .iter()
                .zip(&current.values)
                .map(|(&d, &v)| [d, v])
                .collect();
            plot_ui.line(Line::new(points).name(&frame.current_label).width(2.0));

            if fix_bounds {
                if let Some((y_min, y_max)) = frame.y_range {
                    let x_min = current.distances.iter().copied().fold(f64::INFINITY, f64::min);
                    let x_max = current.distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, y_min], [x_max, y_max]));
                }
            }

            if let Some(pointer) = plot_ui.pointer_coordinate() {
                if let Some((x, y)) = current.nearest(pointer.x, pointer.y, HOVER_TOLERANCE) {
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), format!("({x:.2}, {y:.2})"))
                            .color(Color32::WHITE),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Point overlay
// ---------------------------------------------------------------------------

/// Scatter the joined points, coloured by value. Input order is kept so
/// the highest values are drawn on top.
pub fn points_plot(ui: &mut Ui, overlay: &[OverlayPoint]) {
    let color_map = ValueColorMap::from_values(overlay.iter().map(|p| p.value));

    if let Some(cm) = &color_map {
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Deformation Value:");
            for (v, c) in cm.legend_entries(5) {
                ui.colored_label(c, format!("{v:.2}"));
            }
        });
    }

    Plot::new("points_plot")
        .x_axis_label("X Coordinate")
        .y_axis_label("Y Coordinate")
        .data_aspect(1.0)
        .show(ui, |plot_ui| {
            for p in overlay {
                let color = color_map
                    .map(|cm| cm.color_for(p.value))
                    .unwrap_or(Color32::LIGHT_BLUE);
                plot_ui.points(
                    Points::new(vec![[p.x, p.y]])
                        .radius(4.0)
                        .color(color)
                        .name(&p.id),
                );
            }
        });
}
