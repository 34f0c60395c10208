//! Application state for the docgen API

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use docgen_engine::{
    ChromiumRenderer, DocumentStore, RenderOptions, RenderPipeline, TemplateCatalog,
};

use crate::config::ServiceConfig;

pub struct AppState {
    pub pipeline: RenderPipeline,
    pub db: SqlitePool,
    pub config: ServiceConfig,
    pub started_at: Instant,
}

impl AppState {
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;

        Self::run_migrations(&pool).await?;

        let catalog = TemplateCatalog::new(&config.templates_dir);
        let store = DocumentStore::new(&config.documents_dir);
        let renderer = Arc::new(ChromiumRenderer::new(config.chromium_path.clone()));
        let options = RenderOptions {
            timeout_ms: config.render_timeout_ms,
            ..RenderOptions::default()
        };
        let pipeline = RenderPipeline::new(
            catalog,
            store,
            renderer,
            config.public_base_url.clone(),
            options,
        );

        Ok(Self {
            pipeline,
            db: pool,
            config,
            started_at: Instant::now(),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS template_sessions (
                id TEXT PRIMARY KEY,
                template_name TEXT NOT NULL,
                data_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_template_sessions_name
            ON template_sessions(template_name)
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }
}
