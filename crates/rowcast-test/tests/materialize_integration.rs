//! Integration tests for result-set materialization through a session.
//!
//! Each test queues recorded result sets on an in-memory connection and
//! checks the rows every entry point produces.

use rowcast_common::types::{ScalarValue, UnsupportedKind};
use rowcast_common::RowcastError;
use rowcast_core::cursor::ResultSet;
use rowcast_test::fixtures::{employees, every_kind, session};

#[test]
fn test_string_maps_keep_row_order_and_nulls() {
    let mut session = session([employees()]);
    let rows = session.query_string("SELECT * FROM employees").unwrap();

    assert_eq!(rows.len(), 3);
    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, ["1", "2", "3"]);
    assert_eq!(rows[0]["salary"], "5200.5");
    assert_eq!(rows[1]["name"], "");
    assert_eq!(rows[1]["salary"], "4100");
    assert_eq!(rows[2]["salary"], "");

    let keys: Vec<&String> = rows[0].keys().collect();
    assert_eq!(keys, ["id", "name", "salary"]);
}

#[test]
fn test_slices_follow_column_order() {
    let mut session = session([employees()]);
    let rows = session.query_slice_string("SELECT * FROM employees").unwrap();
    assert_eq!(
        rows,
        vec![
            vec!["1".to_string(), "ann".to_string(), "5200.5".to_string()],
            vec!["2".to_string(), String::new(), "4100".to_string()],
            vec!["3".to_string(), "cy".to_string(), String::new()],
        ]
    );
}

#[test]
fn test_value_maps_are_unconverted() {
    let mut session = session([employees()]);
    let rows = session.query_value("SELECT * FROM employees").unwrap();
    assert_eq!(rows[0]["id"], ScalarValue::Int64(1));
    assert_eq!(rows[0]["salary"], ScalarValue::Float64(5200.5));
    assert!(rows[1]["name"].is_null());
}

#[test]
fn test_byte_maps() {
    let mut session = session([every_kind()]);
    let rows = session.query("SELECT * FROM kinds").unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["blob"], b"bytes");
    assert_eq!(row["nul"], b"0");
    assert_eq!(row["i64"], b"-64");
    assert!(row["none"].is_empty());
}

#[test]
fn test_every_kind_converts() {
    let mut session = session([every_kind()]);
    let rows = session.query_string("SELECT * FROM kinds").unwrap();
    let row = &rows[0];

    assert_eq!(row["i8"], "-8");
    assert_eq!(row["i16"], "-16");
    assert_eq!(row["i32"], "-32");
    assert_eq!(row["u8"], "8");
    assert_eq!(row["u16"], "16");
    assert_eq!(row["u32"], "32");
    assert_eq!(row["u64"], "18446744073709551615");
    assert_eq!(row["f32"], "1.5");
    assert_eq!(row["f64"], "0.1");
    assert_eq!(row["flag"], "true");
    assert_eq!(row["c64"], "(1-1i)");
    assert_eq!(row["c128"], "(0.5+2i)");
    assert_eq!(row["text"], "plain");
    assert_eq!(row["blob"], "bytes");
    assert_eq!(row["nul"], "0");
    assert_eq!(row["local"], "2024-05-06T07:08:09+02:00");
    assert_eq!(row["utc"], "2024-05-06T05:08:09Z");
    assert_eq!(row["none"], "");
}

#[test]
fn test_empty_result_set() {
    let mut session = session([ResultSet::new(["a", "b"])]);
    assert!(session.query_string("SELECT a, b FROM t").unwrap().is_empty());
    assert_eq!(session.connection().cursor_close_count(), 1);
}

#[test]
fn test_duplicate_column_names_keep_last_value() {
    let set = ResultSet::new(["id", "id"]).row([ScalarValue::Int64(1), ScalarValue::Int64(2)]);
    let mut session = session([set]);
    let rows = session.query_string("SELECT a.id, b.id FROM a, b").unwrap();
    assert_eq!(rows[0].len(), 1);
    assert_eq!(rows[0]["id"], "2");
}

#[test]
fn test_unsupported_kind_fails_the_call() {
    let set = ResultSet::new(["ok", "bad"])
        .row([ScalarValue::Int64(1), ScalarValue::Int64(2)])
        .row([
            ScalarValue::Int64(3),
            ScalarValue::Unsupported(UnsupportedKind::Map),
        ]);
    let mut session = session([set]);
    let err = session.query_string("SELECT * FROM t").unwrap_err();
    match err {
        RowcastError::UnsupportedScalarKind { kind } => assert_eq!(kind, "map"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.connection().cursor_close_count(), 1);
}

#[test]
fn test_value_mode_passes_unsupported_through() {
    let set = ResultSet::new(["bad"]).row([ScalarValue::Unsupported(UnsupportedKind::Channel)]);
    let mut session = session([set]);
    let rows = session.query_value("SELECT * FROM t").unwrap();
    assert_eq!(
        rows[0]["bad"],
        ScalarValue::Unsupported(UnsupportedKind::Channel)
    );
}

#[test]
fn test_ordered_selection_reorders() {
    let set = ResultSet::new(["a", "b", "c"]).row([
        ScalarValue::text("x"),
        ScalarValue::text("y"),
        ScalarValue::text("z"),
    ]);
    let mut session = session([set]);
    let result = session.query_ordered("SELECT * FROM t", &[2, 0]).unwrap();
    assert_eq!(result.columns, ["c", "a"]);
    assert_eq!(result.len(), 1);
    let entries: Vec<(&str, &str)> = result.rows[0]
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(entries, [("c", "z"), ("a", "x")]);
}

#[test]
fn test_ordered_empty_selection_keeps_all_columns() {
    let mut session = session([employees()]);
    let result = session.query_ordered("SELECT * FROM employees", &[]).unwrap();
    assert_eq!(result.columns, ["id", "name", "salary"]);
    assert_eq!(result.len(), 3);
}

#[test]
fn test_selection_out_of_range_fails_before_rows() {
    // A scan failure on row 0 would surface first if rows were read.
    let set = employees().fail_scan_at(0);
    let mut session = session([set]);
    let err = session.query_ordered("SELECT * FROM employees", &[0, 5]).unwrap_err();
    assert!(matches!(
        err,
        RowcastError::SelectionIndexOutOfRange { index: 5, width: 3 }
    ));
    assert_eq!(session.connection().cursor_close_count(), 1);
}

#[test]
fn test_scan_failure_discards_partial_rows() {
    let mut session = session([employees().fail_scan_at(1)]);
    let err = session.query_slice_string("SELECT * FROM employees").unwrap_err();
    assert!(matches!(err, RowcastError::ScanFailed { .. }));
    assert_eq!(session.connection().cursor_close_count(), 1);
}

#[test]
fn test_iteration_error_is_reported() {
    let mut session = session([employees().fail_advance_at(2)]);
    let err = session.query_value("SELECT * FROM employees").unwrap_err();
    assert!(matches!(err, RowcastError::CursorFailed { .. }));
}

#[test]
fn test_column_failure_is_reported() {
    let mut session = session([employees().fail_columns("metadata unavailable")]);
    let err = session.query("SELECT * FROM employees").unwrap_err();
    assert!(matches!(err, RowcastError::CursorFailed { .. }));
    assert_eq!(session.connection().cursor_close_count(), 1);
}

#[test]
fn test_cursor_close_failure_after_success() {
    let mut session = session([employees().fail_close("lost connection")]);
    let err = session.query_string("SELECT * FROM employees").unwrap_err();
    assert!(matches!(err, RowcastError::CursorFailed { .. }));
}

#[test]
fn test_execution_failure_consumes_no_result_set() {
    let mut session = session([employees()]);
    session.connection_mut().fail_next("syntax error");
    let err = session.query_string("SELEC 1").unwrap_err();
    assert!(matches!(err, RowcastError::ExecutionFailed { .. }));
    assert_eq!(session.connection().pending(), 1);

    let rows = session.query_string("SELECT * FROM employees").unwrap();
    assert_eq!(rows.len(), 3);
}
