use thiserror::Error;

/// Typed failures of the calibration operations. Calibration state is left
/// unchanged whenever one of these is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("not enough samples: got {got}, need {need}")]
    InsufficientData { got: usize, need: usize },
    #[error("channel must be tared before calibrating")]
    NotTared,
    #[error("known weight must be > 0")]
    InvalidWeight,
    #[error("raw reading changed by only {delta} counts (need >= {need})")]
    WeightChangeTooSmall { delta: f64, need: f64 },
}

#[derive(Debug, Error, Clone)]
pub enum AcquisitionError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("transport fault: {0}")]
    TransportFault(String),
    #[error("device disconnected")]
    Disconnected,
    #[error("invalid state: {0}")]
    State(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
