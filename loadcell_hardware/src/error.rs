use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("serial open error: {0}")]
    Open(String),
    #[error("serial configuration error: {0}")]
    Config(String),
    #[error("device disconnected")]
    Disconnected,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
