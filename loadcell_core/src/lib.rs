#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core acquisition pipeline (device-agnostic).
//!
//! This crate turns a line-oriented device stream into calibrated,
//! windowed, recordable weight series. All device interaction goes through
//! `loadcell_traits::Transport`.
//!
//! ## Architecture
//!
//! - **Parsing**: device line protocol → raw samples (`parse` module)
//! - **Calibration**: per-channel raw→grams state machine (`calibration`)
//! - **Storage**: bounded per-channel ring series (`store`)
//! - **Statistics**: trailing-window display stats (`stats`)
//! - **Recording**: start/stop capture and CSV export (`recording`)
//! - **Acquisition**: producer thread + operator surface (`acquisition`)

pub mod acquisition;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod parse;
pub mod recording;
pub mod stats;
pub mod store;

pub use acquisition::{LinkState, Monitor, SETTLE_WINDOW};
pub use calibration::{
    CalibrationMode, ChannelCalibration, DEFAULT_CALIBRATION_FACTOR, MIN_CALIBRATION_RAW_DELTA,
    MIN_SETTLE_SAMPLES,
};
pub use config::{AcquisitionCfg, DisplayCfg};
pub use error::{AcquisitionError, CalibrationError};
pub use parse::{RawSample, parse_line};
pub use recording::{RecordedValue, RecordingSession, Row};
pub use stats::WindowStats;
pub use store::{ChannelSeries, DEFAULT_CAPACITY, SeriesWindow};
