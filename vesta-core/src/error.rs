//! Error types for Vesta

use thiserror::Error;

/// Result type for Vesta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Vesta
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was missing or malformed, named by parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
