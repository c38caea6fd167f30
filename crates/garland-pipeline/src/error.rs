//! Error types for the version pipeline.

use thiserror::Error;

use garland_history::HistoryError;

/// Errors from a generation cycle.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The external generator produced no usable artifact. The history
    /// store is untouched when this is returned.
    #[error("generation failed: {reason}")]
    GenerationFailed { reason: String },

    /// The history store failed while resolving the base or committing
    /// the result.
    #[error("history error: {0}")]
    History(#[from] HistoryError),
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
