use tokio::net::TcpListener;
use tracing::warn;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// The Garland service.
pub struct GarlandServer {
    config: ServerConfig,
}

impl GarlandServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let state = AppState::from_config(&self.config).await?;

        // Re-align the active artifact with HEAD before accepting
        // traffic. A storage hiccup here is logged, not fatal; requests
        // surface their own errors.
        if let Err(err) = state.history.startup_restore().await {
            warn!(%err, "startup restore failed");
        }

        let app = build_router(state, &self.config);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("garland server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|err| ServerError::Internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = GarlandServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "0.0.0.0:8002".parse().unwrap());
    }
}
