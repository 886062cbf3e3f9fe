//! Core error type for COSI storage operations.

use ruststack_cosi_model::error::CosiError;

/// Errors raised by a [`StorageBackend`](crate::storage::StorageBackend).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A bucket with this name exists with different parameters.
    #[error("bucket '{bucket}' already exists with different parameters")]
    BucketConflict {
        /// The conflicting bucket name.
        bucket: String,
    },
    /// The backend could not complete the operation.
    #[error("storage backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Convert a storage error into a COSI error.
///
/// Takes `e` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
pub fn storage_error_to_cosi(e: StorageError) -> CosiError {
    match e {
        StorageError::BucketConflict { .. } => CosiError::already_exists(e.to_string()),
        StorageError::Backend(_) => CosiError::internal(e.to_string()).with_source(e),
    }
}
