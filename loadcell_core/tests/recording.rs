use chrono::Local;
use loadcell_core::{RecordedValue, RecordingSession};

fn value(raw: f64, calibrated: f64) -> Vec<RecordedValue> {
    vec![RecordedValue { raw, calibrated }]
}

#[test]
fn records_relative_to_recording_start() {
    let mut rec = RecordingSession::new();
    rec.start(0.0);
    rec.record(1.0, Local::now(), value(10.0, 1.0));
    rec.record(2.0, Local::now(), value(20.0, 2.0));
    rec.record(3.0, Local::now(), value(30.0, 3.0));

    let rows = rec.rows();
    assert_eq!(rows.len(), 3);
    let elapsed: Vec<f64> = rows.iter().map(|r| r.elapsed_s).collect();
    assert_eq!(elapsed, vec![1.0, 2.0, 3.0]);
    assert_eq!(rows[0].channels[0].raw, 10.0);
    assert_eq!(rows[2].channels[0].calibrated, 3.0);
}

#[test]
fn restart_discards_previous_rows() {
    let mut rec = RecordingSession::new();
    rec.start(0.0);
    rec.record(1.0, Local::now(), value(10.0, 1.0));
    rec.stop();
    assert_eq!(rec.len(), 1, "rows survive stop for export");

    rec.start(10.0);
    assert!(rec.is_empty(), "restart clears prior rows");
    rec.record(12.5, Local::now(), value(40.0, 4.0));
    assert_eq!(rec.rows()[0].elapsed_s, 2.5);
}

#[test]
fn record_while_inactive_is_a_noop() {
    let mut rec = RecordingSession::new();
    rec.record(1.0, Local::now(), value(10.0, 1.0));
    assert!(rec.is_empty());

    rec.start(0.0);
    rec.stop();
    rec.record(5.0, Local::now(), value(10.0, 1.0));
    assert!(rec.is_empty());
}

#[test]
fn stop_is_idempotent() {
    let mut rec = RecordingSession::new();
    rec.stop();
    rec.stop();
    assert!(!rec.is_active());
}

#[test]
fn clear_discards_rows() {
    let mut rec = RecordingSession::new();
    rec.start(0.0);
    rec.record(1.0, Local::now(), value(10.0, 1.0));
    rec.clear();
    assert!(rec.is_empty());
}

#[test]
fn csv_single_channel_header_and_rows() {
    let mut rec = RecordingSession::new();
    rec.start(0.0);
    rec.record(0.25, Local::now(), value(12345.0, 1.5));
    rec.record(0.5, Local::now(), value(12400.0, 2.0));

    let mut out = Vec::new();
    rec.write_csv(&mut out, 1).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Windows_Timestamp,Recording_Time_s,Raw_Value,Calibrated_g"
    );
    let first: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(first.len(), 4);
    // Local wall clock at millisecond precision, e.g. 2026-08-07 10:15:42.123
    assert!(first[0].contains(' ') && first[0].contains('.'));
    assert_eq!(first[1], "0.250");
    assert_eq!(first[2], "12345");
    assert_eq!(first[3], "1.5");
    assert_eq!(lines.count(), 1);
}

#[test]
fn csv_multi_channel_header_names_each_channel() {
    let mut rec = RecordingSession::new();
    rec.start(0.0);
    rec.record(
        1.0,
        Local::now(),
        vec![
            RecordedValue {
                raw: 1.0,
                calibrated: 0.1,
            },
            RecordedValue {
                raw: 2.0,
                calibrated: 0.2,
            },
        ],
    );

    let mut out = Vec::new();
    rec.write_csv(&mut out, 2).unwrap();
    let text = String::from_utf8(out).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "Windows_Timestamp,Recording_Time_s,Raw_CH1,Calibrated_CH1_g,Raw_CH2,Calibrated_CH2_g"
    );
}

#[test]
fn export_csv_writes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.csv");

    let mut rec = RecordingSession::new();
    rec.start(0.0);
    rec.record(1.0, Local::now(), value(10.0, 1.0));
    rec.export_csv(&path, 1).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Windows_Timestamp"));
    assert_eq!(text.lines().count(), 2);
}
