use thiserror::Error;

#[derive(Debug, Error)]
pub enum DripError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad timestamp: {0}")]
    Timestamp(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DripError>;
