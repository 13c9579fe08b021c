//! `From` implementations bridging `loadcell_config` types to core types.

use crate::calibration::{CalibrationMode, ChannelCalibration};
use crate::config::{AcquisitionCfg, DisplayCfg};
use loadcell_config::{ChannelCalRecord, SingleChannelCalibrationFile};

// ── AcquisitionCfg ───────────────────────────────────────────────────────────

impl From<&loadcell_config::AcquisitionCfg> for AcquisitionCfg {
    fn from(c: &loadcell_config::AcquisitionCfg) -> Self {
        Self {
            channel_count: c.channel_count,
            capacity: c.capacity,
            poll_ms: c.poll_ms,
            read_timeout_ms: c.read_timeout_ms,
        }
    }
}

// ── DisplayCfg ───────────────────────────────────────────────────────────────

impl From<&loadcell_config::DisplayCfg> for DisplayCfg {
    fn from(c: &loadcell_config::DisplayCfg) -> Self {
        Self {
            window_s: c.window_s,
            tick_hz: c.tick_hz,
        }
    }
}

// ── Calibration records (nested multi-channel schema) ────────────────────────

impl From<&ChannelCalRecord> for ChannelCalibration {
    fn from(r: &ChannelCalRecord) -> Self {
        ChannelCalibration::from_mode(
            CalibrationMode::TareFactor {
                zero_point: r.zero_point,
                factor: r.calibration_factor,
            },
            r.is_tared,
            r.is_calibrated,
        )
    }
}

impl ChannelCalibration {
    /// Snapshot as the nested-schema per-channel record. Legacy modes are
    /// flattened to their zero reference and the default factor; the
    /// tare/factor model round-trips exactly.
    pub fn to_record(&self) -> ChannelCalRecord {
        ChannelCalRecord {
            zero_point: self.zero_reference(),
            calibration_factor: self.factor(),
            is_calibrated: self.is_calibrated(),
            is_tared: self.is_tared(),
        }
    }
}

// ── Flat single-channel schema (legacy) ──────────────────────────────────────

impl From<&SingleChannelCalibrationFile> for ChannelCalibration {
    fn from(f: &SingleChannelCalibrationFile) -> Self {
        let mode = match f.calibration_mode {
            1 => CalibrationMode::OnePoint {
                cal_raw_zero: f.cal_raw_zero,
                scale_factor: f.scale_factor,
            },
            2 => CalibrationMode::TwoPoint {
                point1_raw: f.cal_raw_point1,
                weight1: f.cal_weight1,
                point2_raw: f.cal_raw_point2,
                weight2: f.cal_weight2,
                zero_offset: f.zero_offset,
            },
            _ => CalibrationMode::ZeroOnly {
                zero_offset: f.zero_offset,
            },
        };
        // The legacy zero correction is a tare; a file of this vintage was
        // written by an operator who had zeroed the cell, so the loaded
        // state applies immediately.
        ChannelCalibration::from_mode(mode, true, f.calibration_mode >= 1)
    }
}

/// Flat-file snapshot of a legacy-mode calibration; `None` for the
/// tare/factor model, which only the nested schema can express.
pub fn to_single_file(c: &ChannelCalibration) -> Option<SingleChannelCalibrationFile> {
    let mut file = SingleChannelCalibrationFile::default();
    match *c.mode() {
        CalibrationMode::ZeroOnly { zero_offset } => {
            file.calibration_mode = 0;
            file.zero_offset = zero_offset;
        }
        CalibrationMode::OnePoint {
            cal_raw_zero,
            scale_factor,
        } => {
            file.calibration_mode = 1;
            file.cal_raw_zero = cal_raw_zero;
            file.scale_factor = scale_factor;
        }
        CalibrationMode::TwoPoint {
            point1_raw,
            weight1,
            point2_raw,
            weight2,
            zero_offset,
        } => {
            file.calibration_mode = 2;
            file.cal_raw_point1 = point1_raw;
            file.cal_weight1 = weight1;
            file.cal_raw_point2 = point2_raw;
            file.cal_weight2 = weight2;
            file.zero_offset = zero_offset;
        }
        CalibrationMode::TareFactor { .. } => return None,
    }
    Some(file)
}
