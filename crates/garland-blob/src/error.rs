//! Error types for blob backend operations.

use thiserror::Error;

/// Errors from blob backend operations.
///
/// The taxonomy is deliberately small: a key is either absent
/// (recoverable, caller decides) or the backend itself failed
/// (retryable at caller discretion).
#[derive(Debug, Error)]
pub enum BlobError {
    /// No blob exists at the requested key.
    #[error("blob not found: {key}")]
    NotFound { key: String },

    /// The backend could not complete the operation (I/O or network failure).
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}

impl BlobError {
    /// Build a `NotFound` for the given key.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Build an `Unavailable` from any underlying cause.
    pub fn unavailable(cause: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            reason: cause.to_string(),
        }
    }

    /// Returns `true` if this error means "the key is absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;
