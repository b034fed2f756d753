/// Data layer: parsing, transforms, and export.
///
/// Architecture:
/// ```text
///  .tsv export (31-line preamble + table)
///        │
///        ▼
///   ┌──────────┐   anchor: locate "x-axis" / "Tare" cells
///   │  loader   │  parse file → MeasurementDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  tare / zero-from-timestamp / range → working matrix
///   └──────────┘
///        │
///        ├──► locked   (frozen comparison curves)
///        ├──► points   (positional join with a points CSV)
///        └──► export   (transposed visible slice → csv / tsv / parquet)
/// ```

pub mod anchor;
pub mod export;
pub mod loader;
pub mod locked;
pub mod model;
pub mod pipeline;
pub mod points;
