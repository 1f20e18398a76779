//! Common error types for tunelib

use thiserror::Error;

/// Common result type for tunelib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds shared by every tunelib component
///
/// The API boundary maps each kind to an HTTP status, so new variants must be
/// added there as well.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed, missing or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Requested resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Request conflicts with current state (duplicate membership)
    #[error("{0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Shorthand for a missing entity, e.g. `Error::not_found("Song")`
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }
}
