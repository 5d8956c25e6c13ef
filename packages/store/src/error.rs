//! Storage errors.

use thiserror::Error;

/// Errors raised by the storage seams.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (duplicate email or provider id).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
