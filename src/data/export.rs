use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;
use tempfile::NamedTempFile;

use crate::error::ExportError;

use super::pipeline::TransformPipeline;

pub const DISTANCE_COLUMN: &str = "Distance";

/// Columns per worksheet in the xlsx format.
pub const XLSX_MAX_COLUMNS: usize = 16_384;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Spreadsheet layouts, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Parquet,
    Xlsx,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "txt" => Ok(Self::Tsv),
            "parquet" | "pq" => Ok(Self::Parquet),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Export the visible slice of the working matrix, transposed: a leading
/// `Distance` column, then one column per timestamp, one row per distance
/// inside the active range.
///
/// Output goes to a temporary file next to `path` and is only renamed into
/// place once fully written, so a failure never leaves a complete-looking
/// file behind. `progress` receives coarse percentages (10, 50, 100).
pub fn export_visible(
    path: &Path,
    pipeline: &TransformPipeline,
    timestamps: &[String],
    mut progress: impl FnMut(u8),
) -> Result<(), ExportError> {
    let format = ExportFormat::from_path(path)?;
    let columns = pipeline.visible_columns();
    if columns.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    progress(10);

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;

    match format {
        ExportFormat::Csv => write_delimited(tmp.as_file_mut(), b',', pipeline, timestamps, &columns)?,
        ExportFormat::Tsv => write_delimited(tmp.as_file_mut(), b'\t', pipeline, timestamps, &columns)?,
        ExportFormat::Parquet => write_parquet(tmp.as_file_mut(), pipeline, timestamps, &columns)?,
        ExportFormat::Xlsx => write_xlsx(tmp.as_file_mut(), pipeline, timestamps, &columns)?,
    }
    progress(50);

    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ExportError::Io(e.error))?;
    progress(100);

    log::info!(
        "Exported {} distances x {} timestamps to {}",
        columns.len(),
        timestamps.len(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_delimited(
    file: &mut File,
    delimiter: u8,
    pipeline: &TransformPipeline,
    timestamps: &[String],
    columns: &[usize],
) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(file);

    let mut header = Vec::with_capacity(timestamps.len() + 1);
    header.push(DISTANCE_COLUMN.to_string());
    header.extend(timestamps.iter().cloned());
    writer.write_record(&header)?;

    let working = pipeline.working();
    let distances = pipeline.distances();
    for &j in columns {
        let mut record = Vec::with_capacity(working.len() + 1);
        record.push(distances[j].to_string());
        for row in working {
            let v = row.get(j).copied().unwrap_or(f64::NAN);
            record.push(if v.is_finite() { v.to_string() } else { String::new() });
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(
    file: &mut File,
    pipeline: &TransformPipeline,
    timestamps: &[String],
    columns: &[usize],
) -> Result<(), ExportError> {
    let working = pipeline.working();
    let distances = pipeline.distances();

    let mut fields = vec![Field::new(DISTANCE_COLUMN, DataType::Float64, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(Float64Array::from(
        columns.iter().map(|&j| distances[j]).collect::<Vec<_>>(),
    ))];

    for (name, row) in unique_names(timestamps).into_iter().zip(working) {
        fields.push(Field::new(name, DataType::Float64, true));
        let values: Vec<Option<f64>> = columns
            .iter()
            .map(|&j| row.get(j).copied().filter(|v| v.is_finite()))
            .collect();
        arrays.push(Arc::new(Float64Array::from(values)));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_xlsx(
    file: &mut File,
    pipeline: &TransformPipeline,
    timestamps: &[String],
    columns: &[usize],
) -> Result<(), ExportError> {
    if timestamps.len() + 1 > XLSX_MAX_COLUMNS {
        return Err(ExportError::TooManyColumns {
            columns: timestamps.len() + 1,
            max: XLSX_MAX_COLUMNS,
        });
    }
    let working = pipeline.working();
    let distances = pipeline.distances();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, DISTANCE_COLUMN)?;
    for (k, t) in timestamps.iter().enumerate() {
        sheet.write_string(0, (k + 1) as u16, t.as_str())?;
    }

    for (r, &j) in columns.iter().enumerate() {
        let row = (r + 1) as u32;
        sheet.write_number(row, 0, distances[j])?;
        for (k, values) in working.iter().enumerate() {
            // Non-finite readings stay blank.
            if let Some(v) = values.get(j).copied().filter(|v| v.is_finite()) {
                sheet.write_number(row, (k + 1) as u16, v)?;
            }
        }
    }

    workbook.save_to_writer(file)?;
    Ok(())
}

/// Parquet column names must be distinct; repeated timestamps get a suffix.
fn unique_names(timestamps: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashMap::<&str, usize>::new();
    seen.insert(DISTANCE_COLUMN, 1);
    timestamps
        .iter()
        .map(|t| {
            let count = seen.entry(t.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                t.clone()
            } else {
                format!("{t}_{count}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> TransformPipeline {
        TransformPipeline::new(
            vec![vec![1.0, f64::NAN, 3.0], vec![4.0, 5.0, f64::INFINITY]],
            vec![0.0, 0.5, 1.0],
            Vec::new(),
        )
    }

    fn stamps() -> Vec<String> {
        vec!["t0".into(), "t1".into()]
    }

    #[test]
    fn csv_is_transposed_with_blank_non_finite_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut stages = Vec::new();
        export_visible(&path, &pipeline(), &stamps(), |p| stages.push(p)).unwrap();
        assert_eq!(stages, vec![10, 50, 100]);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Distance,t0,t1", "0,1,4", "0.5,,5", "1,3,"]);
    }

    #[test]
    fn range_limits_exported_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let mut p = pipeline();
        p.restrict_range(0.4, 2.0).unwrap();
        export_visible(&path, &p, &stamps(), |_| {}).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("Distance\tt0\tt1\n0.5\t"));
    }

    #[test]
    fn unsupported_extension_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xls");
        let err = export_visible(&path, &pipeline(), &stamps(), |_| {}).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(ref e) if e == "xls"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_directory_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        let err = export_visible(&path, &pipeline(), &stamps(), |_| {}).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn xlsx_rejects_sheets_wider_than_excel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.xlsx");
        let p = TransformPipeline::new(vec![vec![1.0]; XLSX_MAX_COLUMNS], vec![0.0], Vec::new());
        let stamps: Vec<String> = (0..XLSX_MAX_COLUMNS).map(|i| format!("t{i}")).collect();
        let err = export_visible(&path, &p, &stamps, |_| {}).unwrap_err();
        assert!(matches!(
            err,
            ExportError::TooManyColumns { columns, max } if columns == XLSX_MAX_COLUMNS + 1 && max == XLSX_MAX_COLUMNS
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn duplicate_timestamps_get_suffixes() {
        let names = unique_names(&["a".into(), "a".into(), "Distance".into(), "b".into()]);
        assert_eq!(names, vec!["a", "a_2", "Distance_2", "b"]);
    }
}
