//! Error types for toy-watch

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the watch service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shared crate errors (catalog parsing, config files)
    #[error(transparent)]
    Common(#[from] toy_common::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Share token did not resolve to playable media
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// Unknown or already removed player session
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using toy-watch Error
pub type Result<T> = std::result::Result<T, Error>;
