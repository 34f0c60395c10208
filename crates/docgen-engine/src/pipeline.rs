//! Render pipeline
//!
//! The full generation path: validate the request, resolve the template,
//! derive identity and verification artifacts (final mode only), merge the
//! payload through the template engine, convert the markup to PDF under a
//! bounded timeout, and persist the result when requested.
//!
//! Template source is re-read from the catalog on every render and the
//! template environment is rebuilt per request, so edits to templates take
//! effect immediately at the cost of a small per-request read.

use std::sync::Arc;
use std::time::Duration;

use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;

use docgen_core::identity::derive_document_id;

use crate::catalog::TemplateCatalog;
use crate::error::EngineError;
use crate::renderer::{HtmlRenderer, RenderOptions};
use crate::store::DocumentStore;
use crate::verification;

/// Payload keys injected in final mode. Verification fields always take
/// precedence over caller-supplied keys of the same name.
const KEY_DOCUMENT_ID: &str = "document_id";
const KEY_VERIFICATION_URL: &str = "verification_url";
const KEY_QR_CODE: &str = "qr_code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Ephemeral output: no identity, no verification artifact, no store
    /// write.
    Preview,
    /// Content-addressed output persisted for later verification.
    Final,
}

#[derive(Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    /// Present in final mode only.
    pub document_id: Option<String>,
}

pub struct RenderPipeline {
    catalog: TemplateCatalog,
    store: DocumentStore,
    renderer: Arc<dyn HtmlRenderer>,
    public_base_url: String,
    options: RenderOptions,
}

impl RenderPipeline {
    pub fn new(
        catalog: TemplateCatalog,
        store: DocumentStore,
        renderer: Arc<dyn HtmlRenderer>,
        public_base_url: impl Into<String>,
        options: RenderOptions,
    ) -> Self {
        Self {
            catalog,
            store,
            renderer,
            public_base_url: public_base_url.into(),
            options,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Merge-only path used by the HTML preview endpoint: no identity, no
    /// conversion, no persistence.
    pub fn render_markup(&self, template_name: &str, payload: &Value) -> Result<String, EngineError> {
        validate_template_name(template_name)?;
        let source = self.catalog.load_source(template_name)?;
        merge(template_name, &source, payload)
    }

    /// Render a template with a payload to PDF bytes.
    pub async fn render(
        &self,
        template_name: &str,
        payload: &Value,
        mode: RenderMode,
    ) -> Result<RenderedDocument, EngineError> {
        validate_template_name(template_name)?;
        if !self.catalog.exists(template_name) {
            return Err(EngineError::TemplateNotFound(template_name.to_string()));
        }

        let (payload, document_id) = match mode {
            RenderMode::Final => {
                // Identity is derived from the caller's payload before any
                // augmentation, so re-posting the same data re-addresses the
                // same document.
                let id = derive_document_id(payload);
                let url = verification::verification_url(&self.public_base_url, &id);
                let qr_code = verification::qr_svg_data_url(&url)?;
                (augment(payload, &id, &url, &qr_code), Some(id))
            }
            RenderMode::Preview => (payload.clone(), None),
        };

        let source = self.catalog.load_source(template_name)?;
        let html = merge(template_name, &source, &payload)?;
        let bytes = self.convert(html).await?;

        if let Some(id) = &document_id {
            self.store.save(id, &bytes).await?;
            tracing::info!(template = %template_name, document_id = %id, "document generated");
        } else {
            tracing::info!(template = %template_name, "preview generated");
        }

        Ok(RenderedDocument { bytes, document_id })
    }

    /// Run the renderer on the blocking pool under the configured budget.
    ///
    /// On timeout the request fails immediately; the blocking task keeps its
    /// browser until its own internal timeouts fire, and the browser handle
    /// is reaped on drop either way.
    async fn convert(&self, html: String) -> Result<Vec<u8>, EngineError> {
        let renderer = Arc::clone(&self.renderer);
        let options = self.options.clone();
        let budget_ms = options.timeout_ms;

        let task = tokio::task::spawn_blocking(move || renderer.render_pdf(&html, &options));

        match tokio::time::timeout(Duration::from_millis(budget_ms), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(EngineError::Render(format!(
                "conversion task panicked: {join_error}"
            ))),
            Err(_elapsed) => Err(EngineError::Timeout(budget_ms)),
        }
    }
}

fn validate_template_name(template_name: &str) -> Result<(), EngineError> {
    if template_name.trim().is_empty() {
        return Err(EngineError::InvalidRequest(
            "the template parameter is required".to_string(),
        ));
    }
    Ok(())
}

/// Inject verification fields into an object payload, overriding any
/// caller-supplied keys of the same names. Non-object payloads pass through
/// unchanged: there is nowhere to attach the fields.
fn augment(payload: &Value, document_id: &str, url: &str, qr_code: &str) -> Value {
    let Value::Object(fields) = payload else {
        tracing::debug!("non-object payload, verification fields not injected");
        return payload.clone();
    };
    let mut fields = fields.clone();
    fields.insert(KEY_DOCUMENT_ID.to_string(), Value::String(document_id.to_string()));
    fields.insert(KEY_VERIFICATION_URL.to_string(), Value::String(url.to_string()));
    fields.insert(KEY_QR_CODE.to_string(), Value::String(qr_code.to_string()));
    Value::Object(fields)
}

/// Merge a payload into template source.
///
/// Undefined variables render as empty output rather than failing: templates
/// are routinely rendered with partial payloads (previews, optional fields).
fn merge(name: &str, source: &str, payload: &Value) -> Result<String, EngineError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    env.add_template(name, source)
        .map_err(|e| EngineError::Render(format!("template parse failed: {e}")))?;
    let template = env
        .get_template(name)
        .map_err(|e| EngineError::Render(e.to_string()))?;
    template
        .render(payload)
        .map_err(|e| EngineError::Render(format!("template merge failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    /// Echoes the merged markup into the "PDF" so tests can assert on what
    /// reached the renderer. Sleeps when the markup contains `SLOW` to
    /// exercise the timeout path.
    struct EchoRenderer;

    impl HtmlRenderer for EchoRenderer {
        fn render_pdf(&self, html: &str, _options: &RenderOptions) -> Result<Vec<u8>, EngineError> {
            if html.contains("SLOW") {
                std::thread::sleep(Duration::from_millis(500));
            }
            Ok(format!("%PDF-1.7\n{html}").into_bytes())
        }
    }

    struct UnavailableRenderer;

    impl HtmlRenderer for UnavailableRenderer {
        fn render_pdf(&self, _html: &str, _options: &RenderOptions) -> Result<Vec<u8>, EngineError> {
            Err(EngineError::RendererUnavailable(
                "no browser binary".to_string(),
            ))
        }
    }

    fn write_template(dir: &Path, name: &str, source: &str) {
        std::fs::write(dir.join(format!("{name}.html")), source).unwrap();
    }

    fn pipeline_in(
        dir: &Path,
        renderer: Arc<dyn HtmlRenderer>,
        timeout_ms: u64,
    ) -> RenderPipeline {
        RenderPipeline::new(
            TemplateCatalog::new(dir),
            DocumentStore::new(dir.join("documents")),
            renderer,
            "http://localhost:3000",
            RenderOptions {
                timeout_ms,
                ..RenderOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn empty_template_name_is_invalid_request() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        for name in ["", "   "] {
            let error = pipeline
                .render(name, &json!({}), RenderMode::Final)
                .await
                .unwrap_err();
            assert!(matches!(error, EngineError::InvalidRequest(_)));
            assert_eq!(error.kind(), "invalid_request");
        }
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let error = pipeline
            .render("missing", &json!({}), RenderMode::Final)
            .await
            .unwrap_err();
        assert!(matches!(error, EngineError::TemplateNotFound(_)));
        assert_eq!(error.kind(), "not_found");
    }

    #[tokio::test]
    async fn preview_mode_produces_no_id_and_no_store_write() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "letter", "<p>{{ body }}</p>");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let document = pipeline
            .render("letter", &json!({ "body": "hi" }), RenderMode::Preview)
            .await
            .unwrap();

        assert!(document.document_id.is_none());
        assert!(!document.bytes.is_empty());
        // The store directory is only created on first write.
        assert!(!dir.path().join("documents").exists());
    }

    #[tokio::test]
    async fn final_mode_round_trips_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "letter", "<p>{{ body }}</p>");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let document = pipeline
            .render("letter", &json!({ "body": "hi" }), RenderMode::Final)
            .await
            .unwrap();

        let id = document.document_id.expect("final mode assigns an id");
        let stored = pipeline.store().retrieve(&id).await.unwrap();
        assert_eq!(stored, document.bytes);
    }

    #[tokio::test]
    async fn final_mode_injects_verification_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_template(
            dir.path(),
            "cert",
            "id={{ document_id }} url={{ verification_url }} qr={{ qr_code }}",
        );
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let document = pipeline
            .render("cert", &json!({ "name": "x" }), RenderMode::Final)
            .await
            .unwrap();

        let id = document.document_id.unwrap();
        let body = String::from_utf8(document.bytes).unwrap();
        assert!(body.contains(&format!("id={id}")));
        assert!(body.contains(&format!("url=http://localhost:3000/api/verify/{id}")));
        assert!(body.contains("qr=data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn verification_fields_override_caller_keys() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "cert", "id={{ document_id }}");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let document = pipeline
            .render(
                "cert",
                &json!({ "document_id": "spoofed" }),
                RenderMode::Final,
            )
            .await
            .unwrap();

        let body = String::from_utf8(document.bytes).unwrap();
        assert!(!body.contains("spoofed"));
        assert!(body.contains(&format!("id={}", document.document_id.unwrap())));
    }

    #[tokio::test]
    async fn identity_ignores_augmentation_and_key_order() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "letter", "<p>{{ body }}</p>");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let a: Value = serde_json::from_str(r#"{"body":"hi","copies":2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"copies":2,"body":"hi"}"#).unwrap();

        let first = pipeline.render("letter", &a, RenderMode::Final).await.unwrap();
        let second = pipeline.render("letter", &b, RenderMode::Final).await.unwrap();

        assert_eq!(first.document_id, second.document_id);
    }

    #[tokio::test]
    async fn preview_markup_skips_conversion() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "letter", "<p>{{ body }}</p>");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let html = pipeline
            .render_markup("letter", &json!({ "body": "hello" }))
            .unwrap();
        assert_eq!(html, "<p>hello</p>");
    }

    #[tokio::test]
    async fn undefined_variables_render_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "letter", "<p>{{ missing }}!</p>");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let html = pipeline.render_markup("letter", &json!({})).unwrap();
        assert_eq!(html, "<p>!</p>");
    }

    #[tokio::test]
    async fn broken_template_surfaces_as_render_error() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "broken", "{% for x in %}");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 1_000);

        let error = pipeline
            .render("broken", &json!({}), RenderMode::Preview)
            .await
            .unwrap_err();
        assert!(matches!(error, EngineError::Render(_)));
        assert_eq!(error.kind(), "render_error");
    }

    #[tokio::test]
    async fn renderer_unavailable_keeps_its_kind() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "letter", "<p>x</p>");
        let pipeline = pipeline_in(dir.path(), Arc::new(UnavailableRenderer), 1_000);

        let error = pipeline
            .render("letter", &json!({}), RenderMode::Preview)
            .await
            .unwrap_err();
        assert!(matches!(error, EngineError::RendererUnavailable(_)));
        assert_eq!(error.kind(), "renderer_unavailable");
    }

    #[tokio::test]
    async fn slow_conversion_times_out() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "slow", "<p>SLOW</p>");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 50);

        let error = pipeline
            .render("slow", &json!({}), RenderMode::Preview)
            .await
            .unwrap_err();
        assert!(matches!(error, EngineError::Timeout(50)));
        assert_eq!(error.kind(), "render_error");
    }

    #[tokio::test]
    async fn a_timed_out_render_does_not_block_a_concurrent_one() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "slow", "<p>SLOW</p>");
        write_template(dir.path(), "fast", "<p>{{ body }}</p>");
        let pipeline = pipeline_in(dir.path(), Arc::new(EchoRenderer), 50);

        let slow_ctx = json!({});
        let fast_ctx = json!({ "body": "ok" });
        let (slow, fast) = tokio::join!(
            pipeline.render("slow", &slow_ctx, RenderMode::Preview),
            pipeline.render("fast", &fast_ctx, RenderMode::Preview),
        );

        assert!(matches!(slow.unwrap_err(), EngineError::Timeout(_)));
        let fast = fast.unwrap();
        assert!(String::from_utf8(fast.bytes).unwrap().contains("<p>ok</p>"));
    }
}
