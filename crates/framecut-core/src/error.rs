//! Error types for Framecut.

use thiserror::Error;

/// Main error type for Framecut operations.
#[derive(Error, Debug)]
pub enum FramecutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Export already in progress")]
    ExportBusy,

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for Framecut operations.
pub type Result<T> = std::result::Result<T, FramecutError>;
