//! Service configuration
//!
//! All environment access happens here, once, at startup. The resulting
//! struct is handed to constructors explicitly so the engine and pipeline
//! never read ambient state.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    /// Base URL under which this service is reachable from outside; used to
    /// build verification URLs embedded in generated documents.
    pub public_base_url: String,
    pub templates_dir: PathBuf,
    pub documents_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub database_url: String,
    /// Explicit browser binary path; when unset the renderer auto-detects.
    pub chromium_path: Option<PathBuf>,
    pub render_timeout_ms: u64,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let templates_dir = PathBuf::from(
            std::env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string()),
        );

        let documents_dir = std::env::var("DOCUMENTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| templates_dir.join("documents"));

        let assets_dir =
            PathBuf::from(std::env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()));

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:docgen.db?mode=rwc".to_string());

        let chromium_path = std::env::var("CHROMIUM_PATH").ok().map(PathBuf::from);

        let render_timeout_ms = std::env::var("RENDER_TIMEOUT_MS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(8_000);

        Self {
            port,
            public_base_url,
            templates_dir,
            documents_dir,
            assets_dir,
            database_url,
            chromium_path,
            render_timeout_ms,
        }
    }
}
