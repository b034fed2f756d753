use std::path::Path;

use crate::config::FormatConfig;
use crate::error::ParseError;

use super::anchor::{self, CellPos};
use super::model::{MeasurementDataset, TareCandidate};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a measurement export from disk.
///
/// Nothing is returned until the whole file has parsed, so a failure never
/// leaves a half-built dataset behind.
pub fn load_measurement_file(
    path: &Path,
    cfg: &FormatConfig,
) -> Result<MeasurementDataset, ParseError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| ParseError::MalformedTable(format!("file is not valid UTF-8: {e}")))?;
    let dataset = parse_measurement_text(&text, cfg)?;
    log::info!(
        "Loaded {} timestamps x {} distances ({} tare candidates) from {}",
        dataset.len(),
        dataset.width(),
        dataset.tare_candidates.len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse the full text of a measurement export.
///
/// Two phases: locate the anchor cells by content, then slice the grid
/// relative to them. Cells that do not coerce to a number become NaN.
pub fn parse_measurement_text(
    text: &str,
    cfg: &FormatConfig,
) -> Result<MeasurementDataset, ParseError> {
    let preview: Vec<String> = text
        .lines()
        .take(cfg.preview_lines)
        .map(str::to_string)
        .collect();

    let body = skip_lines(text, cfg.preamble_lines);
    let table = read_table(body, cfg.delimiter_byte())?;

    let anchor = anchor::locate(&table, &cfg.anchor_marker).ok_or_else(|| {
        ParseError::AnchorNotFound {
            marker: cfg.anchor_marker.clone(),
        }
    })?;

    let n_rows = table.len();
    let n_cols = table.first().map_or(0, Vec::len);
    if n_rows < 2 || n_cols < 2 {
        return Err(ParseError::InsufficientData {
            rows: n_rows,
            columns: n_cols,
        });
    }

    let first = cfg.first_value_column;
    let data_rows = &table[anchor.row + 1..];
    let width = n_cols.saturating_sub(first);
    if data_rows.is_empty() || width == 0 {
        return Err(ParseError::InsufficientData {
            rows: data_rows.len(),
            columns: width,
        });
    }

    let tare_candidates = tare_candidates(&table, anchor, cfg);
    if tare_candidates.is_empty() {
        log::warn!(
            "No '{}' cells found above the '{}' cell",
            cfg.tare_marker,
            cfg.anchor_marker
        );
    }

    let distances = coerce_row(&table[anchor.row], first);
    let timestamps = data_rows.iter().map(|row| row[0].clone()).collect();
    let original_matrix = data_rows.iter().map(|row| coerce_row(row, first)).collect();

    Ok(MeasurementDataset {
        timestamps,
        distances,
        original_matrix,
        tare_candidates,
        preview,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Slice off the first `n` physical lines.
fn skip_lines(text: &str, n: usize) -> &str {
    if n == 0 {
        return text;
    }
    match text.match_indices('\n').nth(n - 1) {
        Some((idx, _)) => &text[idx + 1..],
        None => "",
    }
}

/// Read the delimited body into a rectangular table of strings.
///
/// Short rows are padded with empty cells so every row has the width of the
/// widest one; empty cells later coerce to NaN.
fn read_table(body: &str, delimiter: u8) -> Result<Vec<Vec<String>>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record?;
        table.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let width = table.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut table {
        row.resize(width, String::new());
    }
    Ok(table)
}

/// One candidate per marker cell above the anchor row.
fn tare_candidates(
    table: &[Vec<String>],
    anchor: CellPos,
    cfg: &FormatConfig,
) -> Vec<TareCandidate> {
    anchor::locate_all_above(table, &cfg.tare_marker, anchor.row)
        .into_iter()
        .map(|pos| TareCandidate {
            row: pos.row + 1,
            column: pos.column + 1,
            values: coerce_row(&table[pos.row], cfg.first_value_column),
        })
        .collect()
}

fn coerce_row(row: &[String], first: usize) -> Vec<f64> {
    row.iter().skip(first).map(|c| coerce(c)).collect()
}

/// Numeric coercion: anything unparsable becomes NaN.
pub fn coerce(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}
