use loadcell_core::{ChannelSeries, DEFAULT_CAPACITY};

fn filled(capacity: usize, n: usize) -> ChannelSeries {
    let mut series = ChannelSeries::new(capacity);
    for i in 0..n {
        let t = i as f64;
        series.append(t, t * 10.0, t * 0.1);
    }
    series
}

#[test]
fn default_capacity_matches_deployment() {
    assert_eq!(ChannelSeries::default().capacity(), DEFAULT_CAPACITY);
    assert_eq!(DEFAULT_CAPACITY, 5000);
}

#[test]
fn append_is_bounded_and_fifo() {
    let series = filled(5, 8);
    assert_eq!(series.len(), 5);
    // Oldest three evicted: the window spanning everything starts at t=3.
    let w = series.window(f64::MAX);
    assert_eq!(w.elapsed, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    assert_eq!(w.raw, vec![30.0, 40.0, 50.0, 60.0, 70.0]);
    assert_eq!(w.calibrated.len(), 5);
}

#[test]
fn window_returns_trailing_suffix() {
    let series = filled(100, 10); // elapsed 0..=9
    let w = series.window(3.0);
    assert_eq!(w.elapsed, vec![6.0, 7.0, 8.0, 9.0]);
    assert_eq!(w.raw, vec![60.0, 70.0, 80.0, 90.0]);
}

#[test]
fn window_clamps_to_session_start() {
    let series = filled(100, 3); // elapsed 0, 1, 2
    let w = series.window(30.0);
    assert_eq!(w.len(), 3);
}

#[test]
fn window_of_empty_series_is_empty() {
    let series = ChannelSeries::new(10);
    assert!(series.window(30.0).is_empty());
}

#[test]
fn window_ending_uses_supplied_now() {
    let series = filled(100, 10);
    let w = series.window_ending(20.0, 12.5); // tmin 7.5
    assert_eq!(w.elapsed, vec![8.0, 9.0]);
}

#[test]
fn latest_returns_most_recent_triple() {
    let series = filled(100, 4);
    assert_eq!(series.latest(), Some((3.0, 30.0, 0.30000000000000004)));
    assert_eq!(ChannelSeries::new(4).latest(), None);
}

#[test]
fn recent_raw_takes_trailing_samples() {
    let series = filled(100, 10);
    assert_eq!(series.recent_raw(3), vec![70.0, 80.0, 90.0]);
    assert_eq!(series.recent_raw(100).len(), 10);
    assert!(ChannelSeries::new(4).recent_raw(5).is_empty());
}

#[test]
fn clear_empties_all_sequences() {
    let mut series = filled(100, 10);
    series.clear();
    assert!(series.is_empty());
    assert!(series.window(30.0).is_empty());
    assert_eq!(series.latest(), None);
}
