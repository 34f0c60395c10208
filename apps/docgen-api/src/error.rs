//! Error types for the docgen API
//!
//! Every error leaves the service as a structured envelope
//! `{ "kind": ..., "message": ..., "status": ... }` with a stable kind, so
//! clients can branch without parsing messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use docgen_engine::EngineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Engine(e) => e.kind(),
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::SessionNotFound(_) => "not_found",
            ApiError::Database(_) | ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) => match e {
                EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                EngineError::TemplateNotFound(_) | EngineError::DocumentNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                EngineError::RendererUnavailable(_)
                | EngineError::Render(_)
                | EngineError::Timeout(_)
                | EngineError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Do not leak internals to clients; the log has the detail.
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "database error".to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "kind": self.kind(),
            "message": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
