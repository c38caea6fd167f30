//! Error types for history operations.

use thiserror::Error;

use garland_blob::BlobError;

/// Errors that can occur during history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// No versions have been committed yet.
    #[error("no versions in history")]
    EmptyHistory,

    /// The named version does not exist in history.
    #[error("version not found: {name}")]
    VersionNotFound { name: String },

    /// The blob backend failed.
    #[error("storage error: {0}")]
    Blob(#[from] BlobError),
}

/// Convenience type alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
