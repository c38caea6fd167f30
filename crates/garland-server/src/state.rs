use std::sync::Arc;

use tracing::info;

use garland_blob::{BlobStore, FsBlobStore, HttpBlobConfig, HttpBlobStore};
use garland_history::HistoryStore;
use garland_notify::ChangeNotifier;
use garland_pipeline::{DecorationPipeline, GeminiGenerator, PromptSource};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<HistoryStore>,
    pub pipeline: Arc<DecorationPipeline>,
    pub notifier: Arc<ChangeNotifier>,
}

impl AppState {
    pub fn new(
        history: Arc<HistoryStore>,
        pipeline: Arc<DecorationPipeline>,
        notifier: Arc<ChangeNotifier>,
    ) -> Self {
        Self {
            history,
            pipeline,
            notifier,
        }
    }

    /// Build the full stack described by `config`.
    pub async fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let backend = build_backend(config).await?;
        let history = Arc::new(HistoryStore::new(backend));
        let generator = Arc::new(
            GeminiGenerator::new(config.generator_config())
                .map_err(|err| ServerError::Config(err.to_string()))?,
        );
        let prompts = PromptSource::new(&config.prompt_path);
        let pipeline = Arc::new(DecorationPipeline::new(
            history.clone(),
            generator,
            prompts,
        ));
        Ok(Self::new(history, pipeline, Arc::new(ChangeNotifier::new())))
    }
}

/// Select the blob backend once, by configuration presence: a configured
/// gateway endpoint means remote, otherwise the local data directory.
pub async fn build_backend(config: &ServerConfig) -> ServerResult<Arc<dyn BlobStore>> {
    match &config.storage.endpoint {
        Some(endpoint) => {
            info!(endpoint, "using remote object-store backend");
            let mut http_config = HttpBlobConfig::new(endpoint.clone());
            http_config.auth_token = config.storage.auth_token.clone();
            Ok(Arc::new(HttpBlobStore::new(http_config)?))
        }
        None => {
            info!(dir = %config.data_dir.display(), "using local filesystem backend");
            Ok(Arc::new(FsBlobStore::open(&config.data_dir).await?))
        }
    }
}
