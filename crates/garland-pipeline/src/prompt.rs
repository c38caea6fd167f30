//! Instruction text source.
//!
//! The generation instruction lives in a small JSON file so operators
//! can tune it without a redeploy. A missing or malformed file is never
//! fatal: generation proceeds with the built-in fallback.

use std::path::PathBuf;

use tracing::{debug, warn};

/// Instruction used when the prompt file is missing or unreadable.
pub const FALLBACK_PROMPT: &str = "Synthesize these images. Place the provided decoration \
object (the second image) onto the Christmas Tree (the first image) in a decorative and \
festive way. Return ONLY the composited image.";

/// JSON key holding the instruction text.
const PROMPT_KEY: &str = "decoration_prompt";

/// Loads the generation instruction from a JSON file.
#[derive(Clone, Debug)]
pub struct PromptSource {
    path: PathBuf,
}

impl PromptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The current instruction text, re-read on every call.
    pub async fn instruction(&self) -> String {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(doc) => {
                    if let Some(text) = doc.get(PROMPT_KEY).and_then(|v| v.as_str()) {
                        return text.to_string();
                    }
                    warn!(path = %self.path.display(), key = PROMPT_KEY, "prompt file has no instruction key");
                }
                Err(err) => {
                    warn!(path = %self.path.display(), %err, "prompt file is not valid JSON");
                }
            },
            Err(err) => {
                debug!(path = %self.path.display(), %err, "prompt file unavailable, using fallback");
            }
        }
        FALLBACK_PROMPT.to_string()
    }
}
