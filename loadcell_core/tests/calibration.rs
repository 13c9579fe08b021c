use loadcell_core::{
    CalibrationError, CalibrationMode, ChannelCalibration, DEFAULT_CALIBRATION_FACTOR,
};
use rstest::rstest;

const ZERO_SAMPLES: [f64; 5] = [98.0, 99.0, 100.0, 101.0, 102.0];
const LOADED_SAMPLES: [f64; 5] = [198.0, 199.0, 200.0, 201.0, 202.0];

#[rstest]
#[case(ChannelCalibration::new())]
#[case(ChannelCalibration::from_mode(
    CalibrationMode::ZeroOnly { zero_offset: 5.0 },
    false,
    false
))]
#[case(ChannelCalibration::from_mode(
    CalibrationMode::OnePoint { cal_raw_zero: 10.0, scale_factor: 0.5 },
    false,
    false
))]
#[case(ChannelCalibration::from_mode(
    CalibrationMode::TwoPoint {
        point1_raw: 100.0,
        weight1: 0.0,
        point2_raw: 300.0,
        weight2: 100.0,
        zero_offset: 0.0,
    },
    false,
    false
))]
fn untared_weight_is_zero_for_every_mode(#[case] cal: ChannelCalibration) {
    for raw in [-1e9, -1.0, 0.0, 123.456, 1e9] {
        assert_eq!(cal.weight(raw), 0.0);
    }
}

#[test]
fn tare_then_known_weight_scenario() {
    let mut cal = ChannelCalibration::new();
    cal.tare(&ZERO_SAMPLES).unwrap();
    assert!(cal.is_tared());
    assert_eq!(cal.zero_reference(), 100.0);
    assert_eq!(cal.factor(), DEFAULT_CALIBRATION_FACTOR);

    cal.calibrate_with_weight(&LOADED_SAMPLES, 100.0).unwrap();
    assert!(cal.is_calibrated());
    assert_eq!(cal.zero_reference(), 100.0);
    assert_eq!(cal.factor(), 1.0);
    assert_eq!(cal.weight(200.0), 100.0);
}

#[test]
fn tare_requires_enough_samples() {
    let mut cal = ChannelCalibration::new();
    let err = cal.tare(&[100.0, 100.0, 100.0, 100.0]).unwrap_err();
    assert_eq!(err, CalibrationError::InsufficientData { got: 4, need: 5 });
    assert!(!cal.is_tared());
    assert_eq!(cal.weight(500.0), 0.0);
}

#[test]
fn calibrate_before_tare_fails() {
    let mut cal = ChannelCalibration::new();
    let err = cal.calibrate_with_weight(&LOADED_SAMPLES, 100.0).unwrap_err();
    assert_eq!(err, CalibrationError::NotTared);
    assert!(!cal.is_calibrated());
}

#[rstest]
#[case(0.0)]
#[case(-5.0)]
fn calibrate_rejects_nonpositive_weight(#[case] known_weight: f64) {
    let mut cal = ChannelCalibration::new();
    cal.tare(&ZERO_SAMPLES).unwrap();
    let before = cal.clone();
    let err = cal
        .calibrate_with_weight(&LOADED_SAMPLES, known_weight)
        .unwrap_err();
    assert_eq!(err, CalibrationError::InvalidWeight);
    assert_eq!(cal, before);
}

#[test]
fn calibrate_requires_enough_samples() {
    let mut cal = ChannelCalibration::new();
    cal.tare(&ZERO_SAMPLES).unwrap();
    let before = cal.clone();
    let err = cal
        .calibrate_with_weight(&[200.0, 200.0], 100.0)
        .unwrap_err();
    assert_eq!(err, CalibrationError::InsufficientData { got: 2, need: 5 });
    assert_eq!(cal, before);
}

#[test]
fn calibrate_rejects_small_raw_change() {
    let mut cal = ChannelCalibration::new();
    cal.tare(&ZERO_SAMPLES).unwrap();
    let before = cal.clone();
    // Mean 105: only 5 counts above the tare point, below the 10-count gate.
    let err = cal
        .calibrate_with_weight(&[103.0, 104.0, 105.0, 106.0, 107.0], 100.0)
        .unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::WeightChangeTooSmall { delta, .. } if delta == 5.0
    ));
    assert_eq!(cal, before);
}

#[test]
fn retare_preserves_derived_factor() {
    let mut cal = ChannelCalibration::new();
    cal.tare(&ZERO_SAMPLES).unwrap();
    cal.calibrate_with_weight(&LOADED_SAMPLES, 100.0).unwrap();
    assert_eq!(cal.factor(), 1.0);

    // Re-zero after drift; the counts-per-gram factor must survive.
    cal.tare(&[110.0, 110.0, 110.0, 110.0, 110.0]).unwrap();
    assert_eq!(cal.zero_reference(), 110.0);
    assert_eq!(cal.factor(), 1.0);
    assert!(cal.is_calibrated());
    assert_eq!(cal.weight(160.0), 50.0);
}

#[test]
fn legacy_zero_only_applies_offset() {
    let cal = ChannelCalibration::from_mode(
        CalibrationMode::ZeroOnly { zero_offset: 10.0 },
        true,
        false,
    );
    assert_eq!(cal.weight(25.0), 15.0);
}

#[test]
fn legacy_one_point_scales_from_zero() {
    let cal = ChannelCalibration::from_mode(
        CalibrationMode::OnePoint {
            cal_raw_zero: 100.0,
            scale_factor: 0.5,
        },
        true,
        true,
    );
    assert_eq!(cal.weight(300.0), 100.0);
}

#[test]
fn legacy_two_point_interpolates() {
    let cal = ChannelCalibration::from_mode(
        CalibrationMode::TwoPoint {
            point1_raw: 100.0,
            weight1: 0.0,
            point2_raw: 300.0,
            weight2: 100.0,
            zero_offset: 0.0,
        },
        true,
        true,
    );
    assert_eq!(cal.weight(200.0), 50.0);
    // Extrapolation follows the same line.
    assert_eq!(cal.weight(400.0), 150.0);
}

#[test]
fn legacy_two_point_degenerate_falls_back_to_offset() {
    let cal = ChannelCalibration::from_mode(
        CalibrationMode::TwoPoint {
            point1_raw: 200.0,
            weight1: 10.0,
            point2_raw: 200.0,
            weight2: 90.0,
            zero_offset: 50.0,
        },
        true,
        true,
    );
    assert_eq!(cal.weight(75.0), 25.0);
}

#[test]
fn degenerate_factor_yields_zero_not_infinity() {
    let cal = ChannelCalibration::from_mode(
        CalibrationMode::TareFactor {
            zero_point: 100.0,
            factor: 0.0,
        },
        true,
        true,
    );
    assert_eq!(cal.weight(500.0), 0.0);
}

#[test]
fn flat_record_round_trip_is_exact() {
    let mut cal = ChannelCalibration::new();
    cal.tare(&ZERO_SAMPLES).unwrap();
    cal.calibrate_with_weight(&[1098.0, 1099.0, 1100.0, 1101.0, 1102.0], 250.0)
        .unwrap();

    let record = cal.to_record();
    let restored = ChannelCalibration::from(&record);
    assert_eq!(restored.zero_reference(), cal.zero_reference());
    assert_eq!(restored.factor(), cal.factor());
    assert_eq!(restored.is_tared(), cal.is_tared());
    assert_eq!(restored.is_calibrated(), cal.is_calibrated());
}
