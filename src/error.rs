//! Error types for the measurement core.
//!
//! Per-cell numeric coercion failures have no variant here: such cells
//! become NaN and are filtered by the visibility predicate downstream.

use thiserror::Error;

/// Structural failures while parsing a measurement export.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed table: {0}")]
    MalformedTable(String),

    #[error("no '{marker}' cell found in the file")]
    AnchorNotFound { marker: String },

    #[error("data does not have enough rows or columns to plot ({rows} rows, {columns} columns)")]
    InsufficientData { rows: usize, columns: usize },
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            match e.into_kind() {
                csv::ErrorKind::Io(io) => ParseError::Io(io),
                other => ParseError::MalformedTable(format!("{other:?}")),
            }
        } else {
            ParseError::MalformedTable(e.to_string())
        }
    }
}

/// Failures of a transform-pipeline or range operation. Prior state is kept.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("invalid range {min} to {max}: {reason}")]
    InvalidRange { min: f64, max: f64, reason: String },

    #[error("timestamp index {index} out of range (0..{len})")]
    TimestampOutOfRange { index: usize, len: usize },

    #[error("tare index {index} out of range (0..{len})")]
    TareOutOfRange { index: usize, len: usize },
}

/// Failures while loading a points CSV.
#[derive(Error, Debug)]
pub enum PointsError {
    #[error("failed to read points file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse points CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(
        "CSV file must contain the following columns: {}.\nMissing columns: {}.\nActual columns in the file: {}.",
        .required.join(", "),
        .missing.join(", "),
        .found.join(", ")
    )]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("row {row}: '{value}' in column '{column}' is not a number")]
    InvalidCoordinate {
        row: usize,
        column: String,
        value: String,
    },
}

/// Failures while writing a spreadsheet export. Partial output is never left behind.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("{columns} columns exceed the Excel sheet limit of {max}")]
    TooManyColumns { columns: usize, max: usize },

    #[error("unsupported export extension: .{0}")]
    UnsupportedFormat(String),

    #[error("nothing to export: no distances fall inside the active range")]
    EmptySelection,
}
