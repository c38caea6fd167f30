use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;
use crate::state::AppState;
use crate::ws;

/// Uploaded decorations are images; cap bodies well above any sane one.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the axum router with all Garland endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/upload", post(handler::upload_handler))
        .route("/admin/history", get(handler::history_handler))
        .route("/admin/rollback", post(handler::rollback_handler))
        .route("/admin/restore", post(handler::restore_handler))
        .route("/artifact/current", get(handler::current_artifact_handler))
        .route(
            "/artifact/history/:filename",
            get(handler::version_artifact_handler),
        )
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(handler::health_handler));

    if let Some(static_dir) = &config.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
