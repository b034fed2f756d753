use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, ColorImage};

use strain_viewer::state::{Session, ViewTarget};

use crate::app::UiState;

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_measurement_dialog(session: &mut Session, ui_state: &mut UiState) {
    let file = rfd::FileDialog::new()
        .set_title("Open measurement export")
        .add_filter("TSV files", &["tsv", "txt"])
        .add_filter("All files", &["*"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    match session.load_file(&path) {
        Ok(()) => {
            ui_state.next_tick.clear();
            ui_state.show_points = session.points.is_some();
        }
        Err(e) => {
            log::error!("Failed to load file: {e}");
            session.status_message = Some(format!("Error: failed to load file: {e}"));
        }
    }
}

pub fn open_points_dialog(session: &mut Session, ui_state: &mut UiState) {
    let file = rfd::FileDialog::new()
        .set_title("Open point coordinates")
        .add_filter("CSV Files", &["csv"])
        .pick_file();

    let Some(path) = file else {
        session.status_message = Some("No CSV file selected.".into());
        return;
    };
    match session.load_points(&path) {
        Ok(()) => ui_state.show_points = true,
        Err(e) => {
            log::error!("Failed to load points: {e}");
            session.status_message = Some(format!("Error: {e}"));
        }
    }
}

pub fn export_dialog(session: &mut Session, target: ViewTarget) {
    let file = rfd::FileDialog::new()
        .set_title("Export data")
        .set_file_name("deformation.xlsx")
        .add_filter("Excel files", &["xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .add_filter("Parquet", &["parquet"])
        .save_file();

    let Some(path) = file else {
        return;
    };
    let result = session.export(target, &path, |pct| {
        log::debug!("Export {pct}%");
    });
    session.status_message = Some(match result {
        Ok(()) => format!("Data exported to {}", path.display()),
        Err(e) => {
            log::error!("Failed to export data: {e}");
            format!("Error: failed to export data: {e}")
        }
    });
}

/// Ask the viewport for a screenshot; it arrives as an event next frame.
pub fn save_image_dialog(ctx: &egui::Context, ui_state: &mut UiState) {
    let file = rfd::FileDialog::new()
        .set_title("Save plot image")
        .set_file_name("plot.png")
        .add_filter("PNG files", &["png"])
        .add_filter("JPEG files", &["jpg", "jpeg"])
        .save_file();

    if let Some(path) = file {
        ui_state.pending_screenshot = Some(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
    }
}

/// Write a captured frame; the format follows the file extension.
pub fn save_color_image(path: &Path, image: &ColorImage) -> Result<()> {
    let [w, h] = image.size;
    let bytes: Vec<u8> = image.pixels.iter().flat_map(|c| c.to_array()).collect();
    let rgba = image::RgbaImage::from_raw(w as u32, h as u32, bytes)
        .context("screenshot buffer has unexpected size")?;
    image::DynamicImage::ImageRgba8(rgba)
        .to_rgb8()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))
}
