//! One generation cycle: resolve base, generate, commit, activate.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use garland_history::{HistoryError, HistoryStore, VersionName};

use crate::error::{PipelineError, PipelineResult};
use crate::generator::Generator;
use crate::prompt::PromptSource;

/// Orchestrates "produce a new version from current HEAD plus a new
/// decoration".
///
/// The pipeline never retries and never mutates stored state on a failed
/// generation; success is reported only after the new version is durably
/// committed and HEAD has been advanced.
pub struct DecorationPipeline {
    history: Arc<HistoryStore>,
    generator: Arc<dyn Generator>,
    prompts: PromptSource,
}

impl DecorationPipeline {
    pub fn new(
        history: Arc<HistoryStore>,
        generator: Arc<dyn Generator>,
        prompts: PromptSource,
    ) -> Self {
        Self {
            history,
            generator,
            prompts,
        }
    }

    /// Run one generation cycle with the uploaded decoration.
    pub async fn submit(&self, input: Bytes, input_mime: &str) -> PipelineResult<VersionName> {
        let base = self.resolve_base().await?;
        let instruction = self.prompts.instruction().await;

        let produced = self
            .generator
            .generate(base, input, input_mime, &instruction)
            .await
            .map_err(|err| {
                warn!(%err, "generator call failed");
                PipelineError::GenerationFailed {
                    reason: err.to_string(),
                }
            })?;

        let Some(artifact) = produced else {
            return Err(PipelineError::GenerationFailed {
                reason: "generator returned no image data".to_string(),
            });
        };

        let name = self.history.save_to_history(artifact).await?;
        self.history.set_active(&name).await?;
        info!(version = %name, "new version committed and activated");
        Ok(name)
    }

    /// The base image for the next generation: the HEAD version's bytes
    /// when retrievable, else the active artifact, else nothing (first
    /// generation). A missing blob falls through; a backend outage does
    /// not — generating "from scratch" because storage is down would
    /// corrupt the lineage.
    async fn resolve_base(&self) -> PipelineResult<Option<Bytes>> {
        if let Some(head) = self.history.head().await? {
            match self.history.version_bytes(&head).await {
                Ok(bytes) => {
                    debug!(version = %head, "generating from HEAD");
                    return Ok(Some(bytes));
                }
                Err(HistoryError::VersionNotFound { name }) => {
                    warn!(version = name, "HEAD names a missing version, trying active artifact");
                }
                Err(err) => return Err(err.into()),
            }
        }
        match self.history.active_bytes().await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(HistoryError::Blob(err)) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use garland_blob::{BlobStore, MemoryBlobStore};
    use garland_history::ACTIVE_KEY;

    use crate::generator::GeneratorError;

    enum StubMode {
        Produce(&'static [u8]),
        Empty,
        Fail,
    }

    /// Generator double that records the base passed to each call.
    struct StubGenerator {
        mode: StubMode,
        bases: Mutex<Vec<Option<Bytes>>>,
    }

    impl StubGenerator {
        fn new(mode: StubMode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                bases: Mutex::new(Vec::new()),
            })
        }

        fn recorded_bases(&self) -> Vec<Option<Bytes>> {
            self.bases.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for StubGenerator {
        async fn generate(
            &self,
            base: Option<Bytes>,
            _input: Bytes,
            _input_mime: &str,
            _instruction: &str,
        ) -> Result<Option<Bytes>, GeneratorError> {
            self.bases.lock().unwrap().push(base);
            match &self.mode {
                StubMode::Produce(bytes) => Ok(Some(Bytes::from_static(bytes))),
                StubMode::Empty => Ok(None),
                StubMode::Fail => Err(GeneratorError::Request {
                    reason: "boom".to_string(),
                }),
            }
        }
    }

    fn fixture(
        generator: Arc<StubGenerator>,
    ) -> (Arc<MemoryBlobStore>, Arc<HistoryStore>, DecorationPipeline) {
        let backend = Arc::new(MemoryBlobStore::new());
        let history = Arc::new(HistoryStore::new(backend.clone()));
        let prompts = PromptSource::new("does-not-exist/prompt.json");
        let pipeline = DecorationPipeline::new(history.clone(), generator, prompts);
        (backend, history, pipeline)
    }

    #[tokio::test]
    async fn first_submit_has_no_base_and_commits_one_version() {
        let generator = StubGenerator::new(StubMode::Produce(b"generated"));
        let (_backend, history, pipeline) = fixture(generator.clone());

        let name = pipeline
            .submit(Bytes::from_static(b"ornament"), "image/png")
            .await
            .unwrap();

        assert_eq!(generator.recorded_bases(), vec![None]);
        assert_eq!(history.list_history().await.unwrap(), vec![name.clone()]);
        assert_eq!(history.head().await.unwrap(), Some(name));
        assert_eq!(
            history.active_bytes().await.unwrap().as_ref(),
            b"generated"
        );
    }

    #[tokio::test]
    async fn second_submit_builds_on_the_head_version() {
        let generator = StubGenerator::new(StubMode::Produce(b"generated"));
        let (_backend, _history, pipeline) = fixture(generator.clone());

        pipeline
            .submit(Bytes::from_static(b"first"), "image/png")
            .await
            .unwrap();
        pipeline
            .submit(Bytes::from_static(b"second"), "image/png")
            .await
            .unwrap();

        let bases = generator.recorded_bases();
        assert_eq!(bases.len(), 2);
        assert_eq!(bases[0], None);
        assert_eq!(bases[1].as_deref(), Some(b"generated".as_slice()));
    }

    #[tokio::test]
    async fn generator_failure_leaves_store_untouched() {
        let generator = StubGenerator::new(StubMode::Fail);
        let (backend, history, pipeline) = fixture(generator);

        let err = pipeline
            .submit(Bytes::from_static(b"ornament"), "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::GenerationFailed { .. }));
        assert!(history.list_history().await.unwrap().is_empty());
        assert!(history.head().await.unwrap().is_none());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn empty_generator_output_is_a_failed_generation() {
        let generator = StubGenerator::new(StubMode::Empty);
        let (backend, _history, pipeline) = fixture(generator);

        let err = pipeline
            .submit(Bytes::from_static(b"ornament"), "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::GenerationFailed { .. }));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn active_artifact_is_the_base_when_history_is_empty() {
        let generator = StubGenerator::new(StubMode::Produce(b"generated"));
        let (backend, _history, pipeline) = fixture(generator.clone());

        // An active artifact exists without any history entry (seeded
        // image from before version tracking began).
        backend
            .put(ACTIVE_KEY, Bytes::from_static(b"seeded"), "image/png")
            .await
            .unwrap();

        pipeline
            .submit(Bytes::from_static(b"ornament"), "image/png")
            .await
            .unwrap();

        assert_eq!(
            generator.recorded_bases(),
            vec![Some(Bytes::from_static(b"seeded"))]
        );
    }
}
