//! Engine error taxonomy
//!
//! Every error carries a stable `kind` string so the transport layer can
//! build its structured error envelope without matching on variants.
//! Nothing here is retried internally; retry policy belongs to callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Client-fixable: a required field is missing or empty.
    #[error("{0}")]
    InvalidRequest(String),

    /// Client-fixable: the named template does not exist.
    #[error("template '{0}' is not available")]
    TemplateNotFound(String),

    /// Client-fixable: no document is stored under this id.
    #[error("document '{0}' not found")]
    DocumentNotFound(String),

    /// Operator-fixable: the headless renderer could not be started
    /// (missing browser binary, bad executable path). Not retryable by the
    /// same caller without a configuration change.
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// Template merge or PDF conversion failed for well-formed input.
    #[error("render failed: {0}")]
    Render(String),

    /// The conversion exceeded its time budget.
    #[error("render timed out after {0}ms")]
    Timeout(u64),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Stable machine-readable kind for the transport error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidRequest(_) => "invalid_request",
            EngineError::TemplateNotFound(_) | EngineError::DocumentNotFound(_) => "not_found",
            EngineError::RendererUnavailable(_) => "renderer_unavailable",
            EngineError::Render(_) | EngineError::Timeout(_) => "render_error",
            EngineError::Io(_) => "internal",
        }
    }
}
