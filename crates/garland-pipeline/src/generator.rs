//! The external generator seam.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors from an external generator call.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The request could not be sent or was rejected.
    #[error("generator request failed: {reason}")]
    Request { reason: String },

    /// The response arrived but could not be interpreted.
    #[error("generator response malformed: {reason}")]
    Malformed { reason: String },
}

/// Produces new artifact bytes from a base image, an input image, and an
/// instruction.
///
/// `Ok(None)` is a legitimate outcome, not an error: the generator
/// answered but produced no image (the pipeline reports it as a failed
/// generation without touching stored state). `base` is absent for the
/// first-ever generation.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        base: Option<Bytes>,
        input: Bytes,
        input_mime: &str,
        instruction: &str,
    ) -> Result<Option<Bytes>, GeneratorError>;
}
