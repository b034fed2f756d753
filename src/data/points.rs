use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::PointsError;

pub const POINT_ID_COLUMN: &str = "Point Number";
pub const X_COLUMN: &str = "X Coordinate";
pub const Y_COLUMN: &str = "Y Coordinate";

// ---------------------------------------------------------------------------
// Points table
// ---------------------------------------------------------------------------

/// One row of the points CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// A point paired with the deformation value drawn at it.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Load a points CSV. The first line is a title and is skipped; the next
/// line is the header and must name all three required columns.
pub fn load_points_file(path: &Path) -> Result<Vec<PointRecord>, PointsError> {
    let file = File::open(path)?;
    let points = read_points(file)?;
    log::info!("Loaded {} points from {}", points.len(), path.display());
    Ok(points)
}

pub fn read_points<R: Read>(source: R) -> Result<Vec<PointRecord>, PointsError> {
    let mut source = BufReader::new(source);
    let mut title = String::new();
    source.read_line(&mut title)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let required = [POINT_ID_COLUMN, X_COLUMN, Y_COLUMN];
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PointsError::MissingColumns {
            required: required.iter().map(|s| s.to_string()).collect(),
            missing,
            found: headers,
        });
    }

    let index_of = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let (id_idx, x_idx, y_idx) = (index_of(POINT_ID_COLUMN), index_of(X_COLUMN), index_of(Y_COLUMN));

    let mut points = Vec::new();
    for (row_no, record) in reader.records().enumerate() {
        let record = record?;
        let coord = |idx: usize, column: &str| -> Result<f64, PointsError> {
            let raw = record.get(idx).unwrap_or("");
            raw.trim().parse::<f64>().map_err(|_| PointsError::InvalidCoordinate {
                row: row_no + 1,
                column: column.to_string(),
                value: raw.to_string(),
            })
        };
        points.push(PointRecord {
            id: record.get(id_idx).unwrap_or("").to_string(),
            x: coord(x_idx, X_COLUMN)?,
            y: coord(y_idx, Y_COLUMN)?,
        });
    }
    Ok(points)
}

// ---------------------------------------------------------------------------
// Positional join
// ---------------------------------------------------------------------------

/// Pair a filtered deformation vector with the points table.
///
/// Values are matched to points by position: a short vector is padded with
/// zeros, a long one is truncated. The result is ordered by ascending value
/// so the highest deformations draw last.
pub fn join_points(values: &[f64], points: &[PointRecord]) -> Vec<OverlayPoint> {
    let padded = values.iter().copied().chain(std::iter::repeat(0.0));
    let mut joined: Vec<OverlayPoint> = points
        .iter()
        .zip(padded)
        .map(|(p, value)| OverlayPoint {
            id: p.id.clone(),
            x: p.x,
            y: p.y,
            value,
        })
        .collect();
    joined.sort_by(|a, b| a.value.total_cmp(&b.value));
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<PointRecord> {
        (0..n)
            .map(|i| PointRecord {
                id: format!("P{i}"),
                x: i as f64,
                y: 10.0 * i as f64,
            })
            .collect()
    }

    #[test]
    fn pads_short_vectors_with_zeros() {
        let joined = join_points(&[3.0, -1.0, 2.0], &points(5));
        assert_eq!(joined.len(), 5);
        let values: Vec<f64> = joined.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![-1.0, 0.0, 0.0, 2.0, 3.0]);
        // The padded entries belong to the last two points.
        let zero_ids: Vec<&str> = joined
            .iter()
            .filter(|p| p.value == 0.0)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(zero_ids, vec!["P3", "P4"]);
        assert_eq!(joined[0].id, "P1");
        assert_eq!(joined[4].id, "P0");
    }

    #[test]
    fn truncates_long_vectors() {
        let joined = join_points(&[5.0, 4.0, 3.0, 2.0], &points(2));
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].value, 4.0);
        assert_eq!(joined[0].id, "P1");
        assert_eq!(joined[1].y, 0.0);
    }

    #[test]
    fn reads_points_after_title_line() {
        let csv = "Survey points\nPoint Number,X Coordinate,Y Coordinate,Note\n1,0.5,1.5,a\n2, 2.0 ,3.0,b\n";
        let pts = read_points(csv.as_bytes()).unwrap();
        assert_eq!(
            pts,
            vec![
                PointRecord { id: "1".into(), x: 0.5, y: 1.5 },
                PointRecord { id: "2".into(), x: 2.0, y: 3.0 },
            ]
        );
    }

    #[test]
    fn missing_columns_are_named() {
        let csv = "title\nPoint Number,X,Y Coordinate\n1,2,3\n";
        let err = read_points(csv.as_bytes()).unwrap_err();
        match &err {
            PointsError::MissingColumns { missing, found, .. } => {
                assert_eq!(missing, &vec!["X Coordinate".to_string()]);
                assert_eq!(found, &vec!["Point Number", "X", "Y Coordinate"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("Missing columns: X Coordinate."));
        assert!(msg.contains("Actual columns in the file: Point Number, X, Y Coordinate."));
    }

    #[test]
    fn non_numeric_coordinate_fails() {
        let csv = "title\nPoint Number,X Coordinate,Y Coordinate\n1,abc,3\n";
        let err = read_points(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PointsError::InvalidCoordinate { row: 1, .. }));
    }
}
