use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrbError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt image: {0}")]
    CorruptImage(String),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Encoding failure: {0}")]
    EncodingFailure(String),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<rusqlite::Error> for OrbError {
    fn from(e: rusqlite::Error) -> Self {
        OrbError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for OrbError {
    fn from(e: std::io::Error) -> Self {
        OrbError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrbError>;
