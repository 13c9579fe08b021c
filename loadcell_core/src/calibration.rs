//! Per-channel calibration state machine.
//!
//! The current model is tare-then-known-weight: taring fixes the zero
//! reference, calibrating against a known load derives the counts-per-gram
//! factor. Older builds persisted simpler zero/one/two-point models; those
//! remain selectable so their files keep loading, and any tare/calibrate
//! operation promotes the channel to the tare/factor model.

use crate::error::CalibrationError;

/// Minimum number of recent samples required by tare and calibrate.
pub const MIN_SETTLE_SAMPLES: usize = 5;

/// Minimum raw-count change between the tare point and the loaded
/// reference weight. Carried over from field-proven builds as-is; the unit
/// is raw ADC counts and is not derived from any configured resolution.
/// Treat as a tunable, not user-configurable.
pub const MIN_CALIBRATION_RAW_DELTA: f64 = 10.0;

/// Factor assumed for a channel that was tared but never calibrated
/// (raw counts per gram).
pub const DEFAULT_CALIBRATION_FACTOR: f64 = 1000.0;

/// Calibration strategy with its per-mode parameters. Modeling the modes
/// as a tagged variant keeps partially-populated cross-mode state
/// unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationMode {
    /// weight = (raw - zero_point) / factor
    TareFactor { zero_point: f64, factor: f64 },
    /// Legacy zero correction: weight = raw - zero_offset
    ZeroOnly { zero_offset: f64 },
    /// Legacy one-point: weight = (raw - cal_raw_zero) * scale_factor
    OnePoint { cal_raw_zero: f64, scale_factor: f64 },
    /// Legacy two-point linear interpolation between two known loads.
    /// Coincident points degenerate to the zero correction.
    TwoPoint {
        point1_raw: f64,
        weight1: f64,
        point2_raw: f64,
        weight2: f64,
        zero_offset: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelCalibration {
    mode: CalibrationMode,
    is_tared: bool,
    is_calibrated: bool,
}

impl Default for ChannelCalibration {
    fn default() -> Self {
        Self {
            mode: CalibrationMode::TareFactor {
                zero_point: 0.0,
                factor: DEFAULT_CALIBRATION_FACTOR,
            },
            is_tared: false,
            is_calibrated: false,
        }
    }
}

impl ChannelCalibration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a calibration from persisted state without validation.
    pub fn from_mode(mode: CalibrationMode, is_tared: bool, is_calibrated: bool) -> Self {
        Self {
            mode,
            is_tared,
            is_calibrated,
        }
    }

    pub fn mode(&self) -> &CalibrationMode {
        &self.mode
    }

    pub fn is_tared(&self) -> bool {
        self.is_tared
    }

    pub fn is_calibrated(&self) -> bool {
        self.is_calibrated
    }

    /// Zero reference of the active mode, in raw counts.
    pub fn zero_reference(&self) -> f64 {
        match self.mode {
            CalibrationMode::TareFactor { zero_point, .. } => zero_point,
            CalibrationMode::ZeroOnly { zero_offset } => zero_offset,
            CalibrationMode::OnePoint { cal_raw_zero, .. } => cal_raw_zero,
            CalibrationMode::TwoPoint { zero_offset, .. } => zero_offset,
        }
    }

    /// Counts-per-gram factor; the default when the active mode has none.
    pub fn factor(&self) -> f64 {
        match self.mode {
            CalibrationMode::TareFactor { factor, .. } => factor,
            _ => DEFAULT_CALIBRATION_FACTOR,
        }
    }

    /// Fix the zero reference from recent no-load readings.
    ///
    /// Keeps any previously derived factor; a legacy mode is promoted to
    /// the tare/factor model with the default factor.
    pub fn tare(&mut self, recent_raw: &[f64]) -> Result<(), CalibrationError> {
        if recent_raw.len() < MIN_SETTLE_SAMPLES {
            return Err(CalibrationError::InsufficientData {
                got: recent_raw.len(),
                need: MIN_SETTLE_SAMPLES,
            });
        }
        let factor = match self.mode {
            CalibrationMode::TareFactor { factor, .. } => factor,
            _ => DEFAULT_CALIBRATION_FACTOR,
        };
        self.mode = CalibrationMode::TareFactor {
            zero_point: mean(recent_raw),
            factor,
        };
        self.is_tared = true;
        Ok(())
    }

    /// Derive the counts-per-gram factor from recent readings taken with a
    /// known weight loaded. Requires a prior tare. State is unchanged on
    /// any error.
    pub fn calibrate_with_weight(
        &mut self,
        recent_raw: &[f64],
        known_weight: f64,
    ) -> Result<(), CalibrationError> {
        if !self.is_tared {
            return Err(CalibrationError::NotTared);
        }
        if !(known_weight > 0.0) {
            return Err(CalibrationError::InvalidWeight);
        }
        if recent_raw.len() < MIN_SETTLE_SAMPLES {
            return Err(CalibrationError::InsufficientData {
                got: recent_raw.len(),
                need: MIN_SETTLE_SAMPLES,
            });
        }
        let zero_point = self.zero_reference();
        let raw_change = mean(recent_raw) - zero_point;
        if raw_change.abs() < MIN_CALIBRATION_RAW_DELTA {
            return Err(CalibrationError::WeightChangeTooSmall {
                delta: raw_change,
                need: MIN_CALIBRATION_RAW_DELTA,
            });
        }
        self.mode = CalibrationMode::TareFactor {
            zero_point,
            factor: raw_change / known_weight,
        };
        self.is_calibrated = true;
        Ok(())
    }

    /// Convert a raw reading into calibrated weight.
    ///
    /// Returns exactly 0.0 while untared, for every mode: an untared
    /// channel has no meaningful zero, and 0.0 is the safe display value,
    /// not an error. A degenerate factor also yields 0.0 rather than a
    /// non-finite weight.
    pub fn weight(&self, raw: f64) -> f64 {
        if !self.is_tared {
            return 0.0;
        }
        match self.mode {
            CalibrationMode::TareFactor { zero_point, factor } => {
                if factor == 0.0 || !factor.is_finite() {
                    return 0.0;
                }
                (raw - zero_point) / factor
            }
            CalibrationMode::ZeroOnly { zero_offset } => raw - zero_offset,
            CalibrationMode::OnePoint {
                cal_raw_zero,
                scale_factor,
            } => (raw - cal_raw_zero) * scale_factor,
            CalibrationMode::TwoPoint {
                point1_raw,
                weight1,
                point2_raw,
                weight2,
                zero_offset,
            } => {
                if point2_raw == point1_raw {
                    raw - zero_offset
                } else {
                    let slope = (weight2 - weight1) / (point2_raw - point1_raw);
                    weight1 + slope * (raw - point1_raw)
                }
            }
        }
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

#[cfg(test)]
mod mean_tests {
    use super::mean;

    #[test]
    fn empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn simple_means() {
        assert_eq!(mean(&[2.0]), 2.0);
        assert_eq!(mean(&[98.0, 99.0, 100.0, 101.0, 102.0]), 100.0);
    }
}
