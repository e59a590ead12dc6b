//! Error types for calibridge.

use thiserror::Error;

/// Errors that can occur in calibridge operations.
#[derive(Error, Debug)]
pub enum CalibridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid event: {0}")]
    Validation(String),

    #[error("Event not found: {0}")]
    EventNotFound(u64),

    #[error("Invalid reminder '{0}'. Expected -PT<n>M, -PT<n>H or -P<n>D")]
    InvalidReminder(String),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}

/// Result type alias for calibridge operations.
pub type CalibridgeResult<T> = Result<T, CalibridgeError>;
