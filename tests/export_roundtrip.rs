use std::fs::File;

use arrow::array::{Array, Float64Array};
use calamine::{open_workbook, Data, Reader, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use strain_viewer::config::FormatConfig;
use strain_viewer::data::export::export_visible;
use strain_viewer::state::{Session, ViewTarget};

fn write_export(dir: &std::path::Path) -> std::path::PathBuf {
    let mut text = String::new();
    for i in 0..31 {
        text.push_str(&format!("Instrument header {i}\n"));
    }
    text.push_str("Tare\t\t\t0.5\t0.5\t0.5\t0.5\t0.5\n");
    text.push_str("x-axis\t\t\t3.0\t1.0\tn/a\t2.0\t4.0\n");
    text.push_str("t0\t\t\t1\t2\t3\t4\t5\n");
    text.push_str("t1\t\t\t6\tx\t8\t9\t10\n");
    let path = dir.join("run.tsv");
    std::fs::write(&path, text).unwrap();
    path
}

fn session(dir: &std::path::Path) -> Session {
    let mut s = Session::new(FormatConfig::default());
    s.load_file(&write_export(dir)).unwrap();
    s
}

fn read_distance_column(path: &std::path::Path) -> Vec<f64> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    assert_eq!(reader.headers().unwrap().get(0), Some("Distance"));
    reader
        .records()
        .map(|r| r.unwrap()[0].parse::<f64>().unwrap())
        .collect()
}

#[test]
fn csv_distance_column_matches_restricted_distances() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path());
    let main = s.main.as_mut().unwrap();
    main.pipeline.restrict_range(1.5, 3.5).unwrap();

    let out = dir.path().join("slice.csv");
    s.export(ViewTarget::Main, &out, |_| {}).unwrap();

    // File order is kept; the NaN distance and out-of-range columns drop out.
    assert_eq!(read_distance_column(&out), vec![3.0, 2.0]);
}

#[test]
fn unrestricted_export_keeps_every_finite_distance() {
    let dir = tempfile::tempdir().unwrap();
    let s = session(dir.path());
    let out = dir.path().join("all.csv");
    s.export(ViewTarget::Main, &out, |_| {}).unwrap();
    assert_eq!(read_distance_column(&out), vec![3.0, 1.0, 2.0, 4.0]);

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, vec!["Distance", "t0", "t1"]);
    let second: Vec<String> = reader.records().nth(1).unwrap().unwrap().iter().map(str::to_string).collect();
    // The coerced-away cell exports as an empty value.
    assert_eq!(second, vec!["1", "2", ""]);
}

#[test]
fn export_reflects_zeroing_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path());
    s.main.as_mut().unwrap().pipeline.set_zeroing(true);
    let out = dir.path().join("tared.tsv");
    s.export(ViewTarget::Main, &out, |_| {}).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().nth(1), Some("3\t1.5\t6.5"));
}

#[test]
fn range_window_exports_its_own_slice() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path());
    let id = s.add_range(0.0, 2.0).unwrap();
    let out = dir.path().join("range.csv");
    s.export(ViewTarget::Range(id), &out, |_| {}).unwrap();
    assert_eq!(read_distance_column(&out), vec![1.0, 2.0]);
}

#[test]
fn parquet_distance_column_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session(dir.path());
    s.main.as_mut().unwrap().pipeline.restrict_range(2.0, 4.0).unwrap();
    let out = dir.path().join("slice.parquet");
    let view = s.main.as_ref().unwrap();
    export_visible(&out, &view.pipeline, s.timestamps(), |_| {}).unwrap();

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&out).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let mut distances = Vec::new();
    let mut t1_nulls = 0;
    for batch in reader {
        let batch = batch.unwrap();
        assert_eq!(batch.schema().field(0).name(), "Distance");
        let d = batch.column(0).as_any().downcast_ref::<Float64Array>().unwrap();
        distances.extend(d.values().iter().copied());
        t1_nulls += batch.column(2).null_count();
    }
    assert_eq!(distances, vec![3.0, 2.0, 4.0]);
    assert_eq!(t1_nulls, 0);
}

#[test]
fn xlsx_export_reads_back_with_blank_non_finite_cells() {
    let dir = tempfile::tempdir().unwrap();
    let s = session(dir.path());
    let out = dir.path().join("all.xlsx");
    let mut stages = Vec::new();
    s.export(ViewTarget::Main, &out, |p| stages.push(p)).unwrap();
    assert_eq!(stages, vec![10, 50, 100]);

    let mut workbook: Xlsx<_> = open_workbook(&out).unwrap();
    let sheet = workbook.worksheet_range("Sheet1").unwrap();
    let rows: Vec<&[Data]> = sheet.rows().collect();
    assert_eq!(
        rows[0],
        &[
            Data::String("Distance".into()),
            Data::String("t0".into()),
            Data::String("t1".into()),
        ][..]
    );
    let distances: Vec<f64> = rows[1..]
        .iter()
        .map(|r| match r[0] {
            Data::Float(v) => v,
            ref other => panic!("unexpected distance cell {other:?}"),
        })
        .collect();
    assert_eq!(distances, vec![3.0, 1.0, 2.0, 4.0]);
    assert_eq!(rows[2][1], Data::Float(2.0));
    assert_eq!(rows[2][2], Data::Empty);
}
