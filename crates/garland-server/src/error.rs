use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use garland_blob::BlobError;
use garland_history::HistoryError;
use garland_pipeline::PipelineError;

/// Errors surfaced by the transport layer.
///
/// Every variant maps to a client-visible status and a structured JSON
/// body; no request error terminates the process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    History(#[from] HistoryError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("storage error: {0}")]
    Blob(#[from] BlobError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

fn history_status(err: &HistoryError) -> StatusCode {
    match err {
        HistoryError::EmptyHistory => StatusCode::BAD_REQUEST,
        HistoryError::VersionNotFound { .. } => StatusCode::NOT_FOUND,
        HistoryError::Blob(blob) => blob_status(blob),
    }
}

fn blob_status(err: &BlobError) -> StatusCode {
    if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::History(err) => history_status(err),
            Self::Pipeline(PipelineError::GenerationFailed { .. }) => StatusCode::BAD_GATEWAY,
            Self::Pipeline(PipelineError::History(err)) => history_status(err),
            Self::Blob(err) => blob_status(err),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn status_label(&self) -> &'static str {
        match self {
            Self::Pipeline(PipelineError::GenerationFailed { .. }) => "failed",
            _ => "error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "status": self.status_label(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
