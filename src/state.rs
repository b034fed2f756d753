use std::path::Path;

use crate::config::FormatConfig;
use crate::data::export;
use crate::data::loader::load_measurement_file;
use crate::data::locked::{LockedCurve, LockedCurveSet};
use crate::data::model::MeasurementDataset;
use crate::data::pipeline::{validate_range, Curve, RowStats, TransformPipeline};
use crate::data::points::{join_points, load_points_file, OverlayPoint, PointRecord};
use crate::error::{ExportError, ParseError, PointsError, TransformError};
use crate::playback::{PlaybackController, TickOutcome};

// ---------------------------------------------------------------------------
// TimelineView – one plot window's core state
// ---------------------------------------------------------------------------

/// Everything one plot window needs: its own transform pipeline, cursor,
/// locked curves and playback. The main window and every range window each
/// own an independent instance.
#[derive(Debug, Clone)]
pub struct TimelineView {
    pub pipeline: TransformPipeline,
    pub locked: LockedCurveSet,
    pub playback: PlaybackController,
    cursor: usize,
}

impl TimelineView {
    pub fn new(pipeline: TransformPipeline) -> Self {
        Self {
            pipeline,
            locked: LockedCurveSet::default(),
            playback: PlaybackController::default(),
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.pipeline.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline.rows() == 0
    }

    /// Jump to `idx`, clamped to the timeline (slider input).
    pub fn set_cursor(&mut self, idx: usize) {
        self.cursor = idx.min(self.len().saturating_sub(1));
    }

    /// Step by `delta`; ignored when the target lies outside the timeline.
    pub fn shift(&mut self, delta: i64) -> bool {
        let target = self.cursor as i64 + delta;
        if target < 0 || target >= self.len() as i64 {
            return false;
        }
        self.cursor = target as usize;
        true
    }

    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.playback.tick(self.cursor, self.len());
        if let TickOutcome::Advanced(idx) = outcome {
            self.cursor = idx;
        }
        outcome
    }

    pub fn current_curve(&self) -> Curve {
        self.pipeline.visible_row(self.cursor)
    }

    pub fn stats(&self) -> Option<RowStats> {
        self.pipeline.row_stats(self.cursor)
    }

    pub fn zero_from_current(&mut self) -> Result<(), TransformError> {
        self.pipeline.zero_from_timestamp(self.cursor)
    }

    /// Snapshot the current curve as `Locked: {timestamp}`.
    pub fn lock_current(&mut self, timestamps: &[String]) -> bool {
        let label = format!(
            "Locked: {}",
            timestamps.get(self.cursor).map_or("", String::as_str)
        );
        self.locked.lock(self.current_curve(), label)
    }

    pub fn frame(&self, title: String, timestamps: &[String], y_bounds: YBounds) -> PlotFrame {
        let current = self.current_curve();
        let y_range = y_bounds.resolve(&current.values);
        PlotFrame {
            title,
            current_label: format!(
                "Current: {}",
                timestamps.get(self.cursor).map_or("", String::as_str)
            ),
            current,
            locked: self.locked.curves().to_vec(),
            y_range,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering hand-off
// ---------------------------------------------------------------------------

/// Optional user y-axis limits; each side falls back to the data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl YBounds {
    pub fn resolve(&self, values: &[f64]) -> Option<(f64, f64)> {
        if values.is_empty() {
            return None;
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((self.min.unwrap_or(lo), self.max.unwrap_or(hi)))
    }
}

/// What the rendering collaborator draws for one plot.
#[derive(Debug, Clone)]
pub struct PlotFrame {
    pub title: String,
    pub current_label: String,
    pub current: Curve,
    pub locked: Vec<LockedCurve>,
    pub y_range: Option<(f64, f64)>,
}

// ---------------------------------------------------------------------------
// RangeView – a spawned sub-window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RangeView {
    pub id: usize,
    pub min: f64,
    pub max: f64,
    pub view: TimelineView,
    pub open: bool,
}

impl RangeView {
    pub fn title(&self) -> String {
        format!("Range: {:.2}m to {:.2}m", self.min, self.max)
    }
}

/// Which plot an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewTarget {
    Main,
    Range(usize),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The full application state, independent of rendering.
#[derive(Debug, Default)]
pub struct Session {
    pub format: FormatConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<MeasurementDataset>,

    /// Main plot state; present whenever `dataset` is.
    pub main: Option<TimelineView>,

    pub ranges: Vec<RangeView>,
    next_range_id: usize,

    /// Points table for the overlay window.
    pub points: Option<Vec<PointRecord>>,

    pub y_bounds: YBounds,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Session {
    pub fn new(format: FormatConfig) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// Parse `path` and, only on success, replace the current dataset.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ParseError> {
        let dataset = load_measurement_file(path, &self.format)?;
        self.set_dataset(dataset);
        Ok(())
    }

    /// Ingest a newly parsed dataset. Range windows belong to the old data
    /// and are closed.
    pub fn set_dataset(&mut self, dataset: MeasurementDataset) {
        if dataset.tare_candidates.is_empty() {
            self.status_message = Some(format!(
                "No '{}' cells found above the '{}' cell.",
                self.format.tare_marker, self.format.anchor_marker
            ));
        } else {
            self.status_message = None;
        }
        self.main = Some(TimelineView::new(TransformPipeline::from_dataset(&dataset)));
        self.ranges.clear();
        self.dataset = Some(dataset);
    }

    pub fn timestamps(&self) -> &[String] {
        self.dataset
            .as_ref()
            .map(|ds| ds.timestamps.as_slice())
            .unwrap_or(&[])
    }

    pub fn tare_labels(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|ds| ds.tare_candidates.iter().map(|t| t.label()).collect())
            .unwrap_or_default()
    }

    pub fn view(&self, target: ViewTarget) -> Option<&TimelineView> {
        match target {
            ViewTarget::Main => self.main.as_ref(),
            ViewTarget::Range(id) => self.ranges.iter().find(|r| r.id == id).map(|r| &r.view),
        }
    }

    pub fn view_mut(&mut self, target: ViewTarget) -> Option<&mut TimelineView> {
        match target {
            ViewTarget::Main => self.main.as_mut(),
            ViewTarget::Range(id) => self
                .ranges
                .iter_mut()
                .find(|r| r.id == id)
                .map(|r| &mut r.view),
        }
    }

    // -- main-window operations --

    pub fn select_tare(&mut self, index: usize) -> Result<(), TransformError> {
        match self.main.as_mut() {
            Some(view) => view.pipeline.select_tare(index),
            None => Ok(()),
        }
    }

    /// Clear locked curves and zeroing in the main window.
    pub fn reset_main(&mut self) {
        if let Some(view) = self.main.as_mut() {
            view.locked.clear();
            view.pipeline.reset();
        }
    }

    pub fn lock(&mut self, target: ViewTarget) -> bool {
        let timestamps = self
            .dataset
            .as_ref()
            .map(|ds| ds.timestamps.as_slice())
            .unwrap_or(&[]);
        let view = match target {
            ViewTarget::Main => self.main.as_mut(),
            ViewTarget::Range(id) => self
                .ranges
                .iter_mut()
                .find(|r| r.id == id)
                .map(|r| &mut r.view),
        };
        view.map_or(false, |v| v.lock_current(timestamps))
    }

    /// Spawn an independent range window over `[min, max]`.
    ///
    /// The new window starts from the original data with the main window's
    /// active tare selected; its later transforms never touch the main view.
    pub fn add_range(&mut self, min: f64, max: f64) -> Result<usize, TransformError> {
        let Some(dataset) = self.dataset.as_ref() else {
            return Err(TransformError::InvalidRange {
                min,
                max,
                reason: "no data loaded".into(),
            });
        };
        validate_range(&dataset.distances, min, max)?;

        let mut pipeline = TransformPipeline::from_dataset(dataset);
        pipeline.restrict_range(min, max)?;
        if let Some(tare) = self.main.as_ref().and_then(|v| v.pipeline.active_tare()) {
            pipeline.select_tare(tare)?;
        }

        let id = self.next_range_id;
        self.next_range_id += 1;
        let mut view = TimelineView::new(pipeline);
        if let Some(main) = &self.main {
            view.set_cursor(main.cursor());
        }
        let range = RangeView {
            id,
            min,
            max,
            view,
            open: true,
        };
        log::info!("Opened {}", range.title());
        self.ranges.push(range);
        Ok(id)
    }

    /// Drop range windows the user has closed.
    pub fn prune_ranges(&mut self) {
        self.ranges.retain(|r| r.open);
    }

    // -- point overlay --

    pub fn load_points(&mut self, path: &Path) -> Result<(), PointsError> {
        let points = load_points_file(path)?;
        self.points = Some(points);
        Ok(())
    }

    /// Join the main window's current curve with the points table.
    pub fn overlay(&self) -> Option<Vec<OverlayPoint>> {
        let points = self.points.as_ref()?;
        let view = self.main.as_ref()?;
        Some(join_points(&view.current_curve().values, points))
    }

    // -- export --

    pub fn export(
        &self,
        target: ViewTarget,
        path: &Path,
        progress: impl FnMut(u8),
    ) -> Result<(), ExportError> {
        let view = self.view(target).ok_or(ExportError::EmptySelection)?;
        export::export_visible(path, &view.pipeline, self.timestamps(), progress)
    }

    /// Peak / average / timestamp summary for a view.
    pub fn stats_lines(&self, target: ViewTarget) -> Vec<String> {
        let Some(view) = self.view(target) else {
            return Vec::new();
        };
        let (peak, avg) = match view.stats() {
            Some(s) => (s.peak.to_string(), s.mean.to_string()),
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        let timestamp = self
            .timestamps()
            .get(view.cursor())
            .cloned()
            .unwrap_or_else(|| "N/A".to_string());
        vec![
            format!("Peak Deformation: {peak}"),
            format!("Average Deformation: {avg}"),
            format!("Timestamp: {timestamp}"),
            format!("Slider Position: {}", view.cursor()),
        ]
    }
}
