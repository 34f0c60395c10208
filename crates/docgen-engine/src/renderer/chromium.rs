//! Headless Chromium renderer
//!
//! One browser process per render: acquired on entry, reaped when the
//! `Browser` handle drops on every exit path, so a failed conversion never
//! leaks a Chromium process. Network fetches from inside the page are
//! limited to document/stylesheet/image/font resources; everything else is
//! failed with a blocked-by-client reason.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use headless_chrome::browser::tab::{RequestInterceptor, RequestPausedDecision};
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::FailRequest;
use headless_chrome::protocol::cdp::Network::{ErrorReason, ResourceType};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};

use super::{HtmlRenderer, RenderOptions};
use crate::error::EngineError;

// A4 in inches, matching the original print format.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

#[derive(Debug, Clone, Default)]
pub struct ChromiumRenderer {
    executable: Option<PathBuf>,
}

impl ChromiumRenderer {
    /// `executable` overrides browser auto-detection (the usual setup in
    /// containers, where the system Chromium path is known).
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }
}

impl HtmlRenderer for ChromiumRenderer {
    fn render_pdf(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, EngineError> {
        let timeout = Duration::from_millis(options.timeout_ms);

        let launch = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some(options.viewport))
            .path(self.executable.clone())
            .idle_browser_timeout(timeout)
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
            ])
            .build()
            .map_err(|e| EngineError::RendererUnavailable(e.to_string()))?;

        // Launch failures are environment problems (missing binary, bad
        // path), distinct from render failures.
        let browser = Browser::new(launch).map_err(|e| {
            EngineError::RendererUnavailable(format!(
                "failed to start headless browser: {e}. \
                 Set CHROMIUM_PATH if the browser is not on the default path"
            ))
        })?;

        let tab = browser
            .new_tab()
            .map_err(|e| EngineError::Render(e.to_string()))?;
        tab.set_default_timeout(timeout);

        tab.enable_fetch(None, None)
            .map_err(|e| EngineError::Render(e.to_string()))?;
        tab.enable_request_interception(Arc::new(ResourceClassInterceptor))
            .map_err(|e| EngineError::Render(e.to_string()))?;

        // Base64 data URL sidesteps percent-encoding of the markup.
        let url = format!("data:text/html;base64,{}", BASE64.encode(html));
        tab.navigate_to(&url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| EngineError::Render(format!("navigation failed: {e}")))?;

        let bytes = tab
            .print_to_pdf(Some(pdf_options()))
            .map_err(|e| EngineError::Render(format!("PDF conversion failed: {e}")))?;

        Ok(bytes)
    }
}

fn pdf_options() -> PrintToPdfOptions {
    PrintToPdfOptions {
        print_background: Some(true),
        prefer_css_page_size: Some(true),
        scale: Some(1.0),
        paper_width: Some(A4_WIDTH_IN),
        paper_height: Some(A4_HEIGHT_IN),
        ..PrintToPdfOptions::default()
    }
}

/// Allow only the resource classes a document render legitimately needs.
struct ResourceClassInterceptor;

impl RequestInterceptor for ResourceClassInterceptor {
    fn intercept(
        &self,
        _transport: Arc<Transport>,
        _session_id: SessionId,
        event: RequestPausedEvent,
    ) -> RequestPausedDecision {
        if is_allowed(&event.params.resource_Type) {
            RequestPausedDecision::Continue(None)
        } else {
            RequestPausedDecision::Fail(FailRequest {
                request_id: event.params.request_id,
                error_reason: ErrorReason::BlockedByClient,
            })
        }
    }
}

fn is_allowed(resource: &ResourceType) -> bool {
    matches!(
        resource,
        ResourceType::Document
            | ResourceType::Stylesheet
            | ResourceType::Image
            | ResourceType::Font
    )
}
