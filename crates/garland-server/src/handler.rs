use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use garland_history::{HistoryError, VersionName};
use garland_notify::ChangeEvent;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RollbackRequest {
    pub steps: i64,
}

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub filename: String,
}

/// `POST /upload` — run one generation cycle with the uploaded decoration.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<Value>> {
    let mut upload: Option<(Bytes, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::BadRequest(err.to_string()))?
    {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .unwrap_or("image/png")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|err| ServerError::BadRequest(err.to_string()))?;
            upload = Some((data, content_type));
            break;
        }
    }
    let Some((data, content_type)) = upload else {
        return Err(ServerError::BadRequest("missing \"file\" field".to_string()));
    };

    info!(size = data.len(), %content_type, "decoration received");
    let name = state.pipeline.submit(data, &content_type).await?;
    state.notifier.broadcast(ChangeEvent::ActiveChanged {
        filename: name.to_string(),
    });
    Ok(Json(json!({ "status": "success", "current": name.as_str() })))
}

/// `GET /admin/history` — all versions, newest first.
pub async fn history_handler(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    let history = state.history.list_history().await?;
    let names: Vec<&str> = history.iter().map(|n| n.as_str()).collect();
    Ok(Json(json!({ "history": names })))
}

/// `POST /admin/rollback` — move the active version relative to HEAD.
pub async fn rollback_handler(
    State(state): State<AppState>,
    Json(req): Json<RollbackRequest>,
) -> ServerResult<Json<Value>> {
    let name = state.history.rollback(req.steps).await?;
    state.notifier.broadcast(ChangeEvent::ActiveChanged {
        filename: name.to_string(),
    });
    Ok(Json(json!({ "status": "success", "current": name.as_str() })))
}

/// `POST /admin/restore` — jump directly to a known version.
pub async fn restore_handler(
    State(state): State<AppState>,
    Json(req): Json<RestoreRequest>,
) -> ServerResult<Json<Value>> {
    let name = state.history.restore(&req.filename).await?;
    state.notifier.broadcast(ChangeEvent::ActiveChanged {
        filename: name.to_string(),
    });
    Ok(Json(json!({ "status": "success", "current": name.as_str() })))
}

/// `GET /artifact/current` — bytes of the active version.
pub async fn current_artifact_handler(State(state): State<AppState>) -> ServerResult<Response> {
    let bytes = state.history.active_bytes().await?;
    Ok(png_response(bytes))
}

/// `GET /artifact/history/{filename}` — bytes of a specific version.
pub async fn version_artifact_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ServerResult<Response> {
    let name = VersionName::parse(&filename).ok_or_else(|| {
        ServerError::History(HistoryError::VersionNotFound {
            name: filename.clone(),
        })
    })?;
    let bytes = state.history.version_bytes(&name).await?;
    Ok(png_response(bytes))
}

/// Health check handler.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "subscribers": state.notifier.subscriber_count(),
    }))
}

fn png_response(bytes: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}
