//! Error types for panelmon.

use std::io;
use thiserror::Error;

/// Result type alias for panelmon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for panelmon.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (settings persistence).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error, fatal for the operation that hit it.
    #[error("Configuration error: {0}")]
    Configuration(String),
}
