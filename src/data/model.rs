use std::fmt;

// ---------------------------------------------------------------------------
// TareCandidate – one baseline row found above the anchor
// ---------------------------------------------------------------------------

/// A candidate baseline vector, one per "Tare"-marked cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TareCandidate {
    /// 1-based row within the scanned table.
    pub row: usize,
    /// 1-based column of the marker cell.
    pub column: usize,
    /// Numeric-coerced values, one per distance column (NaN where coercion failed).
    pub values: Vec<f64>,
}

impl TareCandidate {
    pub fn label(&self) -> String {
        format!("Row {}, Column {}", self.row, self.column)
    }
}

impl fmt::Display for TareCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// MeasurementDataset – the complete parsed export
// ---------------------------------------------------------------------------

/// A parsed measurement export. Immutable once built.
///
/// `distances.len()` equals the column count of every row in
/// `original_matrix`; both are sliced from the same column range.
#[derive(Debug, Clone)]
pub struct MeasurementDataset {
    /// One opaque label per matrix row.
    pub timestamps: Vec<String>,
    /// One position per matrix column; NaN where coercion failed.
    pub distances: Vec<f64>,
    /// `timestamps.len()` rows × `distances.len()` columns.
    pub original_matrix: Vec<Vec<f64>>,
    pub tare_candidates: Vec<TareCandidate>,
    /// First raw lines of the file, verbatim, for the preview panel.
    pub preview: Vec<String>,
}

impl MeasurementDataset {
    /// Number of timestamps (N).
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of distance columns (M).
    pub fn width(&self) -> usize {
        self.distances.len()
    }
}
