//! Version pipeline for Garland.
//!
//! Orchestrates one generation cycle: resolve the base artifact from
//! history, call the external image generator with the uploaded
//! decoration and the configured instruction, and on success commit the
//! result as a new active version.
//!
//! # Modules
//!
//! - [`generator`] — The [`Generator`] seam and its error type
//! - [`gemini`] — [`GeminiGenerator`], the production implementation
//! - [`prompt`] — [`PromptSource`], instruction text with a fallback
//! - [`pipeline`] — [`DecorationPipeline`], the cycle itself
//! - [`error`] — Pipeline error types

pub mod error;
pub mod gemini;
pub mod generator;
pub mod pipeline;
pub mod prompt;

pub use error::{PipelineError, PipelineResult};
pub use gemini::{GeminiConfig, GeminiGenerator, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use generator::{Generator, GeneratorError};
pub use pipeline::DecorationPipeline;
pub use prompt::{PromptSource, FALLBACK_PROMPT};
