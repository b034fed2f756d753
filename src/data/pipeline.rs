use crate::error::TransformError;

// ---------------------------------------------------------------------------
// Visibility predicate
// ---------------------------------------------------------------------------

/// Inclusive distance window; defaults to everything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for RangeBounds {
    fn default() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

impl RangeBounds {
    /// Column-level half of the predicate: finite distance inside the window.
    pub fn contains_distance(&self, distance: f64) -> bool {
        distance.is_finite() && distance >= self.min && distance <= self.max
    }

    /// The single filtering rule used by rendering, locking, statistics and
    /// the point overlay.
    pub fn is_visible(&self, value: f64, distance: f64) -> bool {
        value.is_finite() && self.contains_distance(distance)
    }
}

/// A filtered (distance, value) curve for one timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    pub distances: Vec<f64>,
    pub values: Vec<f64>,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Closest point to `(x, y)` if it lies within `tolerance` (plot units).
    pub fn nearest(&self, x: f64, y: f64, tolerance: f64) -> Option<(f64, f64)> {
        self.distances
            .iter()
            .zip(&self.values)
            .map(|(&d, &v)| ((d, v), (x - d).hypot(y - v)))
            .filter(|&(_, dist)| dist < tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }
}

/// Peak and mean over a filtered row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowStats {
    pub peak: f64,
    pub mean: f64,
}

impl RowStats {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let peak = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self { peak, mean })
    }
}

// ---------------------------------------------------------------------------
// TransformPipeline
// ---------------------------------------------------------------------------

/// Derives the working matrix from an immutable original.
///
/// The working matrix is always a function of the original matrix, the
/// zeroing flag, the active tare and the zero-from-timestamp reference rows
/// in the order they were taken; every operation rebuilds it from those inputs.
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    original: Vec<Vec<f64>>,
    distances: Vec<f64>,
    tare_candidates: Vec<Vec<f64>>,
    working: Vec<Vec<f64>>,
    zeroing_enabled: bool,
    active_tare: Option<usize>,
    /// Rows subtracted by `zero_from_timestamp`, replayed in call order.
    references: Vec<Vec<f64>>,
    range: RangeBounds,
}

impl TransformPipeline {
    /// The first candidate, if any, becomes the active tare.
    pub fn new(original: Vec<Vec<f64>>, distances: Vec<f64>, tare_candidates: Vec<Vec<f64>>) -> Self {
        let active_tare = if tare_candidates.is_empty() { None } else { Some(0) };
        Self {
            working: original.clone(),
            original,
            distances,
            tare_candidates,
            zeroing_enabled: false,
            active_tare,
            references: Vec::new(),
            range: RangeBounds::default(),
        }
    }

    pub fn from_dataset(ds: &super::model::MeasurementDataset) -> Self {
        Self::new(
            ds.original_matrix.clone(),
            ds.distances.clone(),
            ds.tare_candidates.iter().map(|t| t.values.clone()).collect(),
        )
    }

    // -- accessors --

    pub fn working(&self) -> &[Vec<f64>] {
        &self.working
    }

    pub fn original(&self) -> &[Vec<f64>] {
        &self.original
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn rows(&self) -> usize {
        self.working.len()
    }

    pub fn zeroing_enabled(&self) -> bool {
        self.zeroing_enabled
    }

    pub fn active_tare(&self) -> Option<usize> {
        self.active_tare
    }

    pub fn active_tare_values(&self) -> Option<&[f64]> {
        self.active_tare
            .and_then(|i| self.tare_candidates.get(i))
            .map(Vec::as_slice)
    }

    pub fn has_tare(&self) -> bool {
        self.active_tare.is_some()
    }

    pub fn range(&self) -> RangeBounds {
        self.range
    }

    // -- transforms --

    /// Apply or remove the active tare. Enabling without an active tare is ignored.
    ///
    /// Any zero-from-timestamp references are discarded.
    pub fn set_zeroing(&mut self, enabled: bool) {
        if enabled && !self.has_tare() {
            log::debug!("Zeroing requested without an active tare; ignored");
            return;
        }
        self.zeroing_enabled = enabled;
        self.references.clear();
        self.rebuild();
    }

    pub fn toggle_zeroing(&mut self) {
        self.set_zeroing(!self.zeroing_enabled);
    }

    /// Subtract the current working row at `idx` from every row.
    ///
    /// Operates on the current working matrix, so calls accumulate instead of
    /// resetting: each call records the subtracted row after the previous ones.
    /// This is not idempotent; only `set_zeroing` and `reset` discard it.
    pub fn zero_from_timestamp(&mut self, idx: usize) -> Result<(), TransformError> {
        let row = self
            .working
            .get(idx)
            .cloned()
            .ok_or(TransformError::TimestampOutOfRange {
                index: idx,
                len: self.working.len(),
            })?;
        self.references.push(row);
        log::debug!("Zeroed from timestamp index {idx}");
        self.rebuild();
        Ok(())
    }

    /// Clear zeroing and any references; the range and tare selection are kept.
    pub fn reset(&mut self) {
        self.zeroing_enabled = false;
        self.references.clear();
        self.rebuild();
    }

    /// Choose a tare candidate; reapplies zeroing when it is on.
    pub fn select_tare(&mut self, index: usize) -> Result<(), TransformError> {
        if index >= self.tare_candidates.len() {
            return Err(TransformError::TareOutOfRange {
                index,
                len: self.tare_candidates.len(),
            });
        }
        self.active_tare = Some(index);
        if self.zeroing_enabled {
            self.set_zeroing(true);
        }
        Ok(())
    }

    /// Narrow which distance columns are visible. The working matrix is untouched.
    pub fn restrict_range(&mut self, min: f64, max: f64) -> Result<(), TransformError> {
        self.range = validate_range(&self.distances, min, max)?;
        log::debug!("Restricted range to [{min}, {max}]");
        Ok(())
    }

    fn rebuild(&mut self) {
        let tare = if self.zeroing_enabled {
            self.active_tare_values()
        } else {
            None
        };
        let references = &self.references;
        let working: Vec<Vec<f64>> = self
            .original
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(j, &v)| {
                        let t = tare.and_then(|t| t.get(j)).copied().unwrap_or(0.0);
                        references
                            .iter()
                            .fold(v + t, |acc, r| acc - r.get(j).copied().unwrap_or(0.0))
                    })
                    .collect()
            })
            .collect();
        self.working = working;
    }

    // -- views --

    /// Row `idx` of the working matrix, filtered by the visibility predicate.
    pub fn visible_row(&self, idx: usize) -> Curve {
        let Some(row) = self.working.get(idx) else {
            return Curve::default();
        };
        let (distances, values) = row
            .iter()
            .zip(&self.distances)
            .filter(|&(&v, &d)| self.range.is_visible(v, d))
            .map(|(&v, &d)| (d, v))
            .unzip();
        Curve { distances, values }
    }

    /// Indices of columns whose distance lies inside the active range.
    pub fn visible_columns(&self) -> Vec<usize> {
        self.distances
            .iter()
            .enumerate()
            .filter(|&(_, &d)| self.range.contains_distance(d))
            .map(|(j, _)| j)
            .collect()
    }

    pub fn row_stats(&self, idx: usize) -> Option<RowStats> {
        RowStats::of(&self.visible_row(idx).values)
    }
}

/// Check a candidate window against the distance axis.
pub fn validate_range(distances: &[f64], min: f64, max: f64) -> Result<RangeBounds, TransformError> {
    if !(min < max) {
        return Err(TransformError::InvalidRange {
            min,
            max,
            reason: "start must be less than end".into(),
        });
    }
    let bounds = RangeBounds { min, max };
    if !distances.iter().any(|&d| bounds.contains_distance(d)) {
        return Err(TransformError::InvalidRange {
            min,
            max,
            reason: "no data points found in the specified range".into(),
        });
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> TransformPipeline {
        TransformPipeline::new(
            vec![
                vec![1.0, 2.0, f64::NAN, 4.0],
                vec![2.0, 4.0, 6.0, f64::INFINITY],
                vec![5.0, 5.0, 5.0, 5.0],
            ],
            vec![0.0, 1.0, 2.0, f64::NAN],
            vec![vec![10.0, 20.0, 30.0, 40.0], vec![-1.0, -1.0, -1.0, -1.0]],
        )
    }

    /// Element-wise equality treating NaN as equal to NaN.
    fn same(a: &[Vec<f64>], b: &[Vec<f64>]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(ra, rb)| {
                ra.len() == rb.len()
                    && ra
                        .iter()
                        .zip(rb)
                        .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
            })
    }

    #[test]
    fn zeroing_adds_tare_and_disabling_restores_original() {
        let mut p = pipeline();
        p.set_zeroing(true);
        assert!(p.zeroing_enabled());
        assert_eq!(p.working()[0][0], 11.0);
        assert_eq!(p.working()[2][3], 45.0);
        p.set_zeroing(false);
        assert!(same(p.working(), p.original()));
    }

    #[test]
    fn enabling_without_tare_is_a_noop() {
        let mut p = TransformPipeline::new(vec![vec![1.0, 2.0]], vec![0.0, 1.0], Vec::new());
        p.set_zeroing(true);
        assert!(!p.zeroing_enabled());
        assert!(same(p.working(), p.original()));
    }

    #[test]
    fn zero_from_timestamp_subtracts_reference_row() {
        let mut p = pipeline();
        p.zero_from_timestamp(2).unwrap();
        assert_eq!(p.working()[0][0], -4.0);
        assert_eq!(p.working()[0][1], -3.0);
        assert!(p.working()[0][2].is_nan());
        assert_eq!(p.working()[2], vec![0.0; 4]);
    }

    #[test]
    fn zero_from_timestamp_is_not_idempotent() {
        // Row 1 carries an infinite reading; the second call subtracts the
        // already-zeroed row (inf - inf = NaN) on top of the first.
        let mut once = pipeline();
        once.zero_from_timestamp(1).unwrap();
        let mut twice = pipeline();
        twice.zero_from_timestamp(1).unwrap();
        twice.zero_from_timestamp(1).unwrap();
        assert_eq!(once.working()[0][3], f64::NEG_INFINITY);
        assert!(twice.working()[0][3].is_nan());
        assert!(!same(once.working(), twice.working()));
    }

    #[test]
    fn zero_from_timestamp_accumulates_across_indices() {
        let mut once = pipeline();
        once.zero_from_timestamp(0).unwrap();
        let mut twice = pipeline();
        twice.zero_from_timestamp(0).unwrap();
        twice.zero_from_timestamp(2).unwrap();
        assert!(!same(once.working(), twice.working()));
        assert_eq!(twice.working()[2][0], 0.0);
        // Row 0 is now relative to row 2 of the already-zeroed data.
        assert_eq!(twice.working()[0][0], -4.0);
    }

    #[test]
    fn zero_from_timestamp_composes_with_tare() {
        let mut p = pipeline();
        p.set_zeroing(true);
        p.zero_from_timestamp(0).unwrap();
        assert_eq!(p.working()[1][0], 1.0);
        assert!(p.zeroing_enabled());
        assert!(p.zero_from_timestamp(3).is_err());
    }

    #[test]
    fn reset_restores_original() {
        let mut p = pipeline();
        p.set_zeroing(true);
        p.zero_from_timestamp(1).unwrap();
        p.reset();
        assert!(!p.zeroing_enabled());
        assert!(same(p.working(), p.original()));
    }

    #[test]
    fn select_tare_reapplies_when_zeroing() {
        let mut p = pipeline();
        p.select_tare(1).unwrap();
        assert!(same(p.working(), p.original()));
        p.set_zeroing(true);
        assert_eq!(p.working()[0][0], 0.0);
        p.select_tare(0).unwrap();
        assert_eq!(p.working()[0][0], 11.0);
        assert_eq!(
            p.select_tare(2),
            Err(TransformError::TareOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(p.active_tare(), Some(0));
    }

    #[test]
    fn restrict_range_only_changes_visibility() {
        let mut p = pipeline();
        let before = p.working().to_vec();
        p.restrict_range(0.5, 2.0).unwrap();
        assert!(same(p.working(), &before));
        let curve = p.visible_row(1);
        assert_eq!(curve.distances, vec![1.0, 2.0]);
        assert_eq!(curve.values, vec![4.0, 6.0]);
        assert!(curve.distances.iter().all(|&d| (0.5..=2.0).contains(&d)));
        assert_eq!(p.visible_columns(), vec![1, 2]);
    }

    #[test]
    fn invalid_ranges_are_rejected_and_keep_state() {
        let mut p = pipeline();
        p.restrict_range(0.0, 1.0).unwrap();
        assert!(matches!(
            p.restrict_range(2.0, 1.0),
            Err(TransformError::InvalidRange { .. })
        ));
        assert!(matches!(
            p.restrict_range(1.0, 1.0),
            Err(TransformError::InvalidRange { .. })
        ));
        assert!(matches!(
            p.restrict_range(10.0, 20.0),
            Err(TransformError::InvalidRange { .. })
        ));
        assert_eq!(p.range(), RangeBounds { min: 0.0, max: 1.0 });
    }

    #[test]
    fn visible_row_drops_non_finite_entries() {
        let p = pipeline();
        let row0 = p.visible_row(0);
        assert_eq!(row0.distances, vec![0.0, 1.0]);
        assert_eq!(row0.values, vec![1.0, 2.0]);
        assert!(p.visible_row(1).values.iter().all(|v| v.is_finite()));
        assert!(p.visible_row(99).is_empty());
    }

    #[test]
    fn later_reference_row_is_exactly_zero() {
        let mut p = TransformPipeline::new(
            vec![
                vec![0.1, 1e20, 3.0],
                vec![0.7, 1.0, 0.3],
                vec![0.2, 5.0, 0.6],
            ],
            vec![0.0, 1.0, 2.0],
            Vec::new(),
        );
        p.zero_from_timestamp(0).unwrap();
        p.zero_from_timestamp(1).unwrap();
        assert_eq!(p.working()[1], vec![0.0; 3]);

        // Same result as subtracting the reference rows one after another.
        let mut expected = p.original().to_vec();
        for idx in [0, 1] {
            let reference = expected[idx].clone();
            for row in &mut expected {
                for (v, r) in row.iter_mut().zip(&reference) {
                    *v -= r;
                }
            }
        }
        assert_eq!(p.working(), expected.as_slice());
        assert_eq!(p.working()[2][1], 0.0);
    }

    #[test]
    fn nearest_respects_tolerance() {
        let curve = Curve {
            distances: vec![0.0, 1.0, 2.0],
            values: vec![0.0, 1.0, 0.0],
        };
        assert_eq!(curve.nearest(1.05, 0.98, 0.1), Some((1.0, 1.0)));
        assert_eq!(curve.nearest(0.5, 0.5, 0.1), None);
    }

    #[test]
    fn stats_over_visible_values() {
        let p = pipeline();
        let stats = p.row_stats(1).unwrap();
        assert_eq!(stats.peak, 6.0);
        assert_eq!(stats.mean, 4.0);
        let empty = TransformPipeline::new(vec![vec![f64::NAN]], vec![0.0], Vec::new());
        assert_eq!(empty.row_stats(0), None);
    }
}
