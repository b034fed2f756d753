//! Content-based anchoring inside a loosely structured table.
//!
//! The measurement grid does not start at a fixed offset; it is found by
//! scanning for marker text instead.

/// A cell position within the scanned table, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPos {
    pub row: usize,
    pub column: usize,
}

fn matches(cell: &str, marker_lower: &str) -> bool {
    cell.to_lowercase().contains(marker_lower)
}

/// First cell (row-major) whose text contains `marker`, case-insensitively.
///
/// Returns `None` for an empty table or when nothing matches.
pub fn locate<S: AsRef<str>>(table: &[Vec<S>], marker: &str) -> Option<CellPos> {
    let marker = marker.to_lowercase();
    table.iter().enumerate().find_map(|(row, cells)| {
        cells
            .iter()
            .position(|c| matches(c.as_ref(), &marker))
            .map(|column| CellPos { row, column })
    })
}

/// Every matching cell in rows strictly above `limit_row`, row-major.
pub fn locate_all_above<S: AsRef<str>>(
    table: &[Vec<S>],
    marker: &str,
    limit_row: usize,
) -> Vec<CellPos> {
    let lowered = marker.to_lowercase();
    let marker = lowered.as_str();
    table
        .iter()
        .take(limit_row)
        .enumerate()
        .flat_map(move |(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(move |(_, c)| matches((*c).as_ref(), marker))
                .map(move |(column, _)| CellPos { row, column })
        })
        .collect()
}
