//! HTTP handlers for the docgen API

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use docgen_core::{analyze, classify};
use docgen_engine::RenderMode;

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Header carrying the content-addressed id of a finalized document.
const DOCUMENT_ID_HEADER: &str = "x-document-id";

/// Liveness check
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "docgen-service",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

/// Liveness check with a template-directory inventory
pub async fn health_detailed(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (templates_status, available) = match state.pipeline.catalog().list() {
        Ok(templates) => (
            "healthy",
            templates.into_iter().map(|t| t.name).collect::<Vec<_>>(),
        ),
        Err(error) => {
            tracing::warn!(%error, "template directory not readable");
            ("error", Vec::new())
        }
    };

    Json(json!({
        "status": "healthy",
        "service": "docgen-service",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "components": {
            "templates": {
                "status": templates_status,
                "count": available.len(),
                "available": available,
            },
        },
    }))
}

/// Readiness check for container orchestration
pub async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    if state.config.templates_dir.is_dir() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "reason": "templates directory not accessible",
            })),
        )
    }
}

/// List available templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TemplateListResponse>, ApiError> {
    let templates = state.pipeline.catalog().list()?;
    tracing::info!(count = templates.len(), "templates listed");
    Ok(Json(TemplateListResponse {
        count: templates.len(),
        templates,
    }))
}

/// Template source plus the inferred structure of its sample document
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TemplateDetailResponse>, ApiError> {
    let catalog = state.pipeline.catalog();
    let descriptor = catalog.describe(&name)?;
    let content = catalog.load_source(&name)?;
    let sample_data = catalog.load_sample(&name);

    let structure = analyze(&sample_data);
    let complexity = classify(&structure);

    tracing::info!(template = %name, %complexity, "template structure served");

    Ok(Json(TemplateDetailResponse {
        name,
        content,
        structure,
        complexity,
        sample_data,
        size: descriptor.size,
        modified: descriptor.modified,
    }))
}

/// Merged HTML preview of a template with its sample data
pub async fn preview_template(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let sample = state.pipeline.catalog().load_sample(&name);
    let html = state.pipeline.render_markup(&name, &sample)?;

    tracing::info!(template = %name, "HTML preview served");

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        ],
        html,
    )
        .into_response())
}

/// Generate a PDF from a template and a JSON payload
pub async fn generate_pdf(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RenderQuery>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    let template = query
        .template
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("the template parameter is required".to_string()))?
        .to_string();

    let mode = if query.preview {
        RenderMode::Preview
    } else {
        RenderMode::Final
    };

    let started = Instant::now();
    let document = state.pipeline.render(&template, &payload, mode).await?;

    tracing::info!(
        template = %template,
        preview = query.preview,
        document_id = document.document_id.as_deref().unwrap_or("-"),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "PDF generated"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    if let Some(id) = &document.document_id {
        let value = HeaderValue::from_str(id)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("invalid document id header: {e}")))?;
        headers.insert(DOCUMENT_ID_HEADER, value);
    }

    Ok((headers, document.bytes).into_response())
}

/// Retrieve a previously generated document by id
pub async fn verify_document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state.pipeline.store().retrieve(&document_id).await?;

    tracing::info!(document_id = %document_id, "document verified and served");

    Ok((
        [
            (header::CONTENT_TYPE.to_string(), "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION.to_string(),
                format!("inline; filename=\"{document_id}.pdf\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Persist a template/payload pair for later recall
pub async fn create_template_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<SessionCreatedResponse>, ApiError> {
    if req.template_name.trim().is_empty() || req.data.is_null() {
        return Err(ApiError::InvalidRequest(
            "templateName and data are required".to_string(),
        ));
    }

    let session_id = Uuid::new_v4().to_string();
    let data_json = serde_json::to_string(&req.data)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("invalid session data: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO template_sessions (id, template_name, data_json, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&session_id)
    .bind(&req.template_name)
    .bind(&data_json)
    .bind(Utc::now().to_rfc3339())
    .execute(&state.db)
    .await?;

    tracing::info!(session_id = %session_id, template = %req.template_name, "session stored");

    Ok(Json(SessionCreatedResponse {
        success: true,
        session_id,
    }))
}

/// Recall a previously stored template session
pub async fn get_template_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TemplateSessionResponse>, ApiError> {
    let session: Option<DbTemplateSession> = sqlx::query_as(
        r#"
        SELECT id, template_name, data_json, created_at
        FROM template_sessions
        WHERE id = ?
        "#,
    )
    .bind(&id)
    .fetch_optional(&state.db)
    .await?;

    let session = session.ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    let data: Value = serde_json::from_str(&session.data_json)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt session data: {e}")))?;

    Ok(Json(TemplateSessionResponse {
        id: session.id,
        template_name: session.template_name,
        data,
        created_at: session.created_at,
    }))
}
