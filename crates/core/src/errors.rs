//! Core error types for the Broker query service.
//!
//! This module defines provider-agnostic error types. Provider-specific errors
//! (from Diesel, SQLite, HTTP clients, etc.) are converted to these types by
//! the crate that owns the provider.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the Broker query service.
#[derive(Error, Debug)]
pub enum Error {
    /// The cache provider could not be reached or the region could not be
    /// acquired.
    #[error("Cache initialization failed: {0}")]
    Initialization(String),

    /// No record exists for the requested key.
    #[error("No broker found for owner: {0}")]
    NotFound(String),

    #[error("Cache operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A companion service (e.g. Portfolio) failed or returned garbage.
    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Short label used when logging the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Initialization(_) => "InitializationError",
            Error::NotFound(_) => "NotFoundError",
            Error::Store(_) => "StoreError",
            Error::Validation(_) => "ValidationError",
            Error::Upstream(_) => "UpstreamError",
            Error::Unexpected(_) => "UnexpectedError",
        }
    }
}

/// Provider-agnostic error type for cache operations.
///
/// This enum uses `String` for all error details so that provider crates can
/// convert their own errors (Diesel, r2d2, ...) into it.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to connect to cache provider: {0}")]
    ConnectionFailed(String),

    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    /// A value could not be encoded for, or decoded from, the provider.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Cache query failed: {0}")]
    QueryFailed(String),
}

/// Validation errors for caller input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Owner mismatch: key is '{key}' but record names '{record}'")]
    OwnerMismatch { key: String, record: String },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(StoreError::Serialization(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
