//! Data models for the docgen API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use docgen_core::{Complexity, StructureReport};
use docgen_engine::TemplateDescriptor;

/// Response for `GET /api/templates`.
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateDescriptor>,
    pub count: usize,
}

/// Response for `GET /api/templates/{name}`: the template source plus the
/// inferred structure of its sample document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetailResponse {
    pub name: String,
    pub content: String,
    #[serde(flatten)]
    pub structure: StructureReport,
    pub complexity: Complexity,
    pub sample_data: Value,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Query parameters for `POST /api/pdf`.
#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub template: Option<String>,
    #[serde(default)]
    pub preview: bool,
}

/// Request body for `POST /api/template-session`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub template_name: String,
    pub data: Value,
}

/// Response for `POST /api/template-session`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreatedResponse {
    pub success: bool,
    pub session_id: String,
}

/// Template session row as stored in the database.
#[derive(Debug, Clone, FromRow)]
pub struct DbTemplateSession {
    pub id: String,
    pub template_name: String,
    pub data_json: String,
    pub created_at: DateTime<Utc>,
}

/// Template session as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSessionResponse {
    pub id: String,
    pub template_name: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}
