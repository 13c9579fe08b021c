//! Runtime configuration structs for the acquisition core.
//!
//! These are separate from the TOML-deserialized config in
//! `loadcell_config`; `conversions.rs` bridges the two.

use crate::store::DEFAULT_CAPACITY;

/// Acquisition loop configuration.
#[derive(Debug, Clone)]
pub struct AcquisitionCfg {
    /// Raw channels per device line (1 and 4 are the deployed shapes).
    pub channel_count: usize,
    /// Ring buffer capacity per channel (samples).
    pub capacity: usize,
    /// Producer sleep between quiet polls (ms).
    pub poll_ms: u64,
    /// Max wait for a complete line per poll (ms).
    pub read_timeout_ms: u64,
}

impl Default for AcquisitionCfg {
    fn default() -> Self {
        Self {
            channel_count: 1,
            capacity: DEFAULT_CAPACITY,
            poll_ms: 10,
            read_timeout_ms: 50,
        }
    }
}

/// Consumer-side display configuration.
#[derive(Debug, Clone)]
pub struct DisplayCfg {
    /// Trailing statistics window (seconds).
    pub window_s: f64,
    /// Display refresh cadence (Hz).
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
