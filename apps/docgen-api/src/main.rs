//! Docgen API Server - template-driven PDF document generation
//!
//! Provides REST endpoints for:
//! - Template discovery and structure analysis
//! - HTML preview and PDF generation (preview and final modes)
//! - Document verification by content-addressed id
//! - Template session storage

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod error;
mod handlers;
mod models;
mod state;

use config::ServiceConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docgen_api=info".parse()?)
                .add_directive("docgen_engine=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let config = ServiceConfig::from_env();
    info!("Initializing docgen API...");
    info!("Templates directory: {}", config.templates_dir.display());
    info!("Documents directory: {}", config.documents_dir.display());

    let port = config.port;
    let assets_dir = config.assets_dir.clone();
    let state = Arc::new(AppState::new(config).await?);

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health checks
        .route("/api/health", get(handlers::health))
        .route("/api/health/detailed", get(handlers::health_detailed))
        .route("/api/ready", get(handlers::ready))
        // Template discovery
        .route("/api/templates", get(handlers::list_templates))
        .route("/api/templates/:name", get(handlers::get_template))
        .route(
            "/api/templates/:name/preview",
            get(handlers::preview_template),
        )
        // Generation and verification
        .route("/api/pdf", post(handlers::generate_pdf))
        .route("/api/verify/:document_id", get(handlers::verify_document))
        // Template sessions
        .route(
            "/api/template-session",
            post(handlers::create_template_session),
        )
        .route(
            "/api/template-session/:id",
            get(handlers::get_template_session),
        )
        // Static assets referenced by templates during conversion
        .nest_service("/assets", ServeDir::new(assets_dir))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting docgen API on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
