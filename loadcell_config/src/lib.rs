#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration persistence for the load-cell monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Calibration settings persist as JSON in one of two schemas: the flat
//!   single-channel form written by older builds and the nested
//!   multi-channel form. Loading tolerates missing fields via defaults and
//!   never rejects a file for partial content.
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SerialCfg {
    /// Port name, e.g. "/dev/ttyACM0" or "COM3"
    pub port: String,
    /// Baud rate of the device stream
    pub baud: u32,
}

impl Default for SerialCfg {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud: 115_200,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AcquisitionCfg {
    /// Number of raw channels per line (observed deployments use 1 or 4)
    pub channel_count: usize,
    /// Ring buffer capacity per channel (samples)
    pub capacity: usize,
    /// Producer poll interval when the transport is quiet (ms)
    pub poll_ms: u64,
    /// Max wait for a complete line per poll (ms)
    pub read_timeout_ms: u64,
}

impl Default for AcquisitionCfg {
    fn default() -> Self {
        Self {
            channel_count: 1,
            capacity: 5000,
            poll_ms: 10,
            read_timeout_ms: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    /// Trailing statistics window in seconds
    pub window_s: f64,
    /// Consumer refresh cadence (Hz)
    pub tick_hz: u32,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            window_s: 30.0,
            tick_hz: 20,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialCfg,
    pub acquisition: AcquisitionCfg,
    pub display: DisplayCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.serial.baud == 0 {
            eyre::bail!("serial.baud must be > 0");
        }

        if self.acquisition.channel_count == 0 {
            eyre::bail!("acquisition.channel_count must be >= 1");
        }
        if self.acquisition.channel_count > 64 {
            eyre::bail!("acquisition.channel_count is unreasonably large (>64)");
        }
        if self.acquisition.capacity == 0 {
            eyre::bail!("acquisition.capacity must be >= 1");
        }
        if self.acquisition.poll_ms == 0 {
            eyre::bail!("acquisition.poll_ms must be >= 1");
        }
        if self.acquisition.read_timeout_ms == 0 {
            eyre::bail!("acquisition.read_timeout_ms must be >= 1");
        }

        if !self.display.window_s.is_finite() || self.display.window_s <= 0.0 {
            eyre::bail!("display.window_s must be > 0");
        }
        if self.display.window_s > 86_400.0 {
            eyre::bail!("display.window_s is unreasonably large (>24h)");
        }
        if self.display.tick_hz == 0 {
            eyre::bail!("display.tick_hz must be > 0");
        }

        Ok(())
    }
}

// ── Calibration persistence ─────────────────────────────────────────────────

fn default_factor() -> f64 {
    1000.0
}
fn default_weight1() -> f64 {
    100.0
}
fn default_weight2() -> f64 {
    500.0
}

/// Per-channel record of the nested multi-channel schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCalRecord {
    #[serde(default)]
    pub zero_point: f64,
    #[serde(default = "default_factor")]
    pub calibration_factor: f64,
    #[serde(default)]
    pub is_calibrated: bool,
    #[serde(default)]
    pub is_tared: bool,
}

impl Default for ChannelCalRecord {
    fn default() -> Self {
        Self {
            zero_point: 0.0,
            calibration_factor: default_factor(),
            is_calibrated: false,
            is_tared: false,
        }
    }
}

/// Nested multi-channel calibration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiChannelCalibrationFile {
    pub channels: Vec<ChannelCalRecord>,
    #[serde(default)]
    pub channel_enabled: Vec<bool>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Flat single-channel calibration file written by older builds.
///
/// `calibration_mode`: 0 = zero-point only, 1 = one-point, 2 = two-point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleChannelCalibrationFile {
    #[serde(default)]
    pub calibration_mode: u8,
    #[serde(default)]
    pub zero_offset: f64,
    #[serde(default = "default_factor")]
    pub scale_factor: f64,
    #[serde(default)]
    pub cal_raw_zero: f64,
    #[serde(default)]
    pub cal_raw_point1: f64,
    #[serde(default)]
    pub cal_raw_point2: f64,
    #[serde(default = "default_weight1")]
    pub cal_weight1: f64,
    #[serde(default = "default_weight2")]
    pub cal_weight2: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Default for SingleChannelCalibrationFile {
    fn default() -> Self {
        Self {
            calibration_mode: 0,
            zero_offset: 0.0,
            scale_factor: default_factor(),
            cal_raw_zero: 0.0,
            cal_raw_point1: 0.0,
            cal_raw_point2: 0.0,
            cal_weight1: default_weight1(),
            cal_weight2: default_weight2(),
            timestamp: None,
        }
    }
}

/// Either persisted schema. The presence of a `channels` key is the sole
/// discriminator, so the multi-channel variant must be tried first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalibrationFile {
    MultiChannel(MultiChannelCalibrationFile),
    SingleChannel(SingleChannelCalibrationFile),
}

pub fn parse_calibration_json(s: &str) -> eyre::Result<CalibrationFile> {
    serde_json::from_str::<CalibrationFile>(s)
        .map_err(|e| eyre::eyre!("malformed calibration JSON: {e}"))
}

pub fn load_calibration_json(path: &Path) -> eyre::Result<CalibrationFile> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read calibration file {:?}: {}", path, e))?;
    parse_calibration_json(&text)
}

pub fn save_calibration_json(path: &Path, file: &CalibrationFile) -> eyre::Result<()> {
    let text = serde_json::to_string_pretty(file)
        .map_err(|e| eyre::eyre!("encode calibration JSON: {e}"))?;
    std::fs::write(path, text).map_err(|e| eyre::eyre!("write calibration file {:?}: {}", path, e))
}

/// Local wall-clock timestamp for the `timestamp` persistence field.
pub fn timestamp_now() -> String {
    chrono::Local::now().to_rfc3339()
}
