//! Error types for the datastore adapter

use thiserror::Error;

/// Result type alias for datastore operations
pub type Result<T> = std::result::Result<T, DatastoreError>;

/// Datastore adapter error types
#[derive(Error, Debug)]
pub enum DatastoreError {
    /// Requested key is absent.
    ///
    /// On the `get` path this also covers backend failures: every miss or
    /// transport error is normalized to `NotFound` so cache-miss handling
    /// in consumers stays uniform. The original backend error is logged at
    /// debug level before normalization.
    #[error("key not found: {0}")]
    NotFound(String),

    /// Transport or protocol-level failure reaching the backend,
    /// surfaced unmodified from every non-`get` path.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// One or more queued operations failed during a batch commit.
    /// The backend may have applied part of the batch; no per-operation
    /// detail is available.
    #[error("batch commit failed: {0}")]
    BatchFailed(String),
}

impl From<redis::RedisError> for DatastoreError {
    fn from(err: redis::RedisError) -> Self {
        DatastoreError::Unavailable(err.to_string())
    }
}
