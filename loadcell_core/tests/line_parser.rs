use loadcell_core::parse_line;
use rstest::rstest;

#[rstest]
#[case("1234,5678", 1, 1234.0, &[5678.0])]
#[case("  1234,5678  \r\n", 1, 1234.0, &[5678.0])]
#[case("0,-42.5", 1, 0.0, &[-42.5])]
#[case("1e3,0.25", 1, 1000.0, &[0.25])]
#[case("10,1,2,3,4", 4, 10.0, &[1.0, 2.0, 3.0, 4.0])]
#[case(" 10 , 1 , 2 , 3 , 4 ", 4, 10.0, &[1.0, 2.0, 3.0, 4.0])]
fn accepts_valid_lines(
    #[case] line: &str,
    #[case] channel_count: usize,
    #[case] device_time_ms: f64,
    #[case] channels: &[f64],
) {
    let sample = parse_line(line, channel_count).expect("line should parse");
    assert_eq!(sample.device_time_ms, device_time_ms);
    assert_eq!(sample.channels, channels);
}

#[rstest]
#[case("", 1)]
#[case("   \r\n", 1)]
#[case("12345", 1)] // no separator
#[case("millis,grams", 1)] // header line
#[case("millis,r1,r2,r3,r4", 4)]
#[case(" millis ,grams", 1)] // header with padding
#[case("12", 1)]
#[case("12,34,56", 1)] // extra trailing field
#[case("1,2,3", 4)] // too few channels
#[case("abc,123", 1)]
#[case("123,abc", 1)]
#[case("123,", 1)]
#[case(",123", 1)]
#[case("12;34", 1)] // wrong separator
fn rejects_invalid_lines(#[case] line: &str, #[case] channel_count: usize) {
    assert_eq!(parse_line(line, channel_count), None, "line: {line:?}");
}

#[test]
fn device_time_is_advisory_only() {
    // Non-monotonic device timestamps still parse; the caller decides what
    // to do with them (the acquisition loop discards them).
    let a = parse_line("500,1.0", 1).unwrap();
    let b = parse_line("100,2.0", 1).unwrap();
    assert!(a.device_time_ms > b.device_time_ms);
}
