//! Store error types.

use thiserror::Error;

/// Errors from store persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot is valid JSON but not an object of keys
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
