//! Storage-specific error types for SQLite operations.
//!
//! This module provides error types that wrap Diesel-specific errors and convert
//! them to the provider-agnostic error types defined in `broker_query_core`.

use broker_query_core::errors::{Error, StoreError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Storage-specific errors that wrap Diesel and r2d2 types.
///
/// These errors are internal to the storage layer and are converted to
/// `broker_query_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    /// r2d2 only fails `get()` once its connection timeout has elapsed.
    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache '{name}' holds {existing} values, not {requested}")]
    RegionTypeMismatch {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("Writer unavailable: {0}")]
    WriterUnavailable(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Store(StoreError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => Error::Store(StoreError::Timeout(e.to_string())),
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::SerializationFailure,
                info,
            )) => Error::Store(StoreError::Timeout(info.message().to_string())),
            StorageError::QueryFailed(DieselError::DeserializationError(e))
            | StorageError::QueryFailed(DieselError::SerializationError(e)) => {
                Error::Store(StoreError::Serialization(e.to_string()))
            }
            StorageError::QueryFailed(e) => Error::Store(StoreError::QueryFailed(e.to_string())),
            StorageError::MigrationFailed(msg) => Error::Initialization(msg),
            StorageError::Io(e) => Error::Initialization(e.to_string()),
            err @ StorageError::RegionTypeMismatch { .. } => {
                Error::Initialization(err.to_string())
            }
            StorageError::WriterUnavailable(msg) => {
                Error::Store(StoreError::ConnectionFailed(msg))
            }
        }
    }
}

/// Extension trait for converting storage results into core results.
pub trait IntoCore<T> {
    fn into_core(self) -> broker_query_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, StorageError> {
    fn into_core(self) -> broker_query_core::Result<T> {
        self.map_err(Error::from)
    }
}
