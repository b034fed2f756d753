mod app;
mod ui;

use app::StrainViewerApp;
use eframe::egui;
use strain_viewer::config::FormatConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let format = FormatConfig::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Strain Viewer – Deformation Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(StrainViewerApp::new(format)))),
    )
}
