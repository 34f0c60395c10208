//! HTML-to-PDF renderer seam
//!
//! The pipeline talks to a [`HtmlRenderer`] trait object; the production
//! implementation drives headless Chromium, tests substitute a mock. The
//! trait is synchronous: the pipeline runs it on the blocking pool and
//! owns the timeout.

pub mod chromium;

pub use chromium::ChromiumRenderer;

use crate::error::EngineError;

/// Fixed render configuration handed to the renderer on every call.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Viewport in CSS pixels.
    pub viewport: (u32, u32),
    /// Navigation/render budget in milliseconds. Enforced by the pipeline;
    /// also applied to the renderer's internal waits.
    pub timeout_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            viewport: (1200, 1600),
            timeout_ms: 8_000,
        }
    }
}

/// Convert an HTML document into PDF bytes.
pub trait HtmlRenderer: Send + Sync {
    fn render_pdf(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, EngineError>;
}
