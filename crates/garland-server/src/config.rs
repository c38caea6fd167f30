use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use garland_pipeline::{GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

use crate::error::{ServerError, ServerResult};

/// Top-level service configuration, loaded from a TOML file with
/// environment overrides for secrets.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Root of the local data directory (local backend only).
    pub data_dir: PathBuf,
    /// Frontend bundle served for unmatched routes when present.
    pub static_dir: Option<PathBuf>,
    /// Browser origins allowed to call the API.
    pub cors_origins: Vec<String>,
    /// Instruction file for the generator.
    pub prompt_path: PathBuf,
    pub storage: StorageConfig,
    pub generator: GeneratorSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8002".parse().unwrap(),
            data_dir: PathBuf::from("assets"),
            static_dir: None,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            prompt_path: PathBuf::from("prompt.json"),
            storage: StorageConfig::default(),
            generator: GeneratorSettings::default(),
        }
    }
}

/// Remote object-store settings.
///
/// The remote backend is selected when `endpoint` is set; otherwise all
/// blobs live under `data_dir` on the local filesystem.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub auth_token: Option<String>,
}

/// External generator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Usually supplied via the `GEMINI_API_KEY` environment variable.
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, or defaults when no path is
    /// given. Environment overrides are applied either way.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|err| {
                    ServerError::Config(format!("cannot read {}: {err}", path.display()))
                })?;
                toml::from_str(&raw)
                    .map_err(|err| ServerError::Config(format!("{}: {err}", path.display())))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Pull secrets from the environment when present.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.generator.api_key = key;
        }
        if let Ok(token) = std::env::var("GARLAND_STORE_TOKEN") {
            self.storage.auth_token = Some(token);
        }
    }

    /// The generator client configuration this server config describes.
    pub fn generator_config(&self) -> GeminiConfig {
        let mut config = GeminiConfig::new(self.generator.api_key.clone());
        config.model = self.generator.model.clone();
        config.endpoint = self.generator.endpoint.clone();
        config.timeout = Duration::from_secs(self.generator.timeout_secs);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "0.0.0.0:8002".parse::<SocketAddr>().unwrap());
        assert_eq!(c.data_dir, PathBuf::from("assets"));
        assert!(c.storage.endpoint.is_none());
        assert_eq!(c.generator.model, DEFAULT_MODEL);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            bind_addr = "127.0.0.1:9000"

            [storage]
            endpoint = "https://store.example.com/garland"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("https://store.example.com/garland")
        );
        assert_eq!(config.prompt_path, PathBuf::from("prompt.json"));
    }

    #[test]
    fn generator_config_carries_settings() {
        let mut config = ServerConfig::default();
        config.generator.api_key = "k".into();
        config.generator.timeout_secs = 7;
        let gen = config.generator_config();
        assert_eq!(gen.api_key, "k");
        assert_eq!(gen.timeout, Duration::from_secs(7));
        assert_eq!(gen.model, DEFAULT_MODEL);
    }
}
