//! Document rendering engine
//!
//! Everything between the HTTP layer and the pure core: the template
//! catalog (filesystem-backed, hot-reloading), the render pipeline
//! (merge → HTML → PDF, with verification artifacts and content-addressed
//! persistence), the document store, and the headless renderer seam.

pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod store;
pub mod verification;

pub use catalog::{TemplateCatalog, TemplateDescriptor};
pub use error::EngineError;
pub use pipeline::{RenderMode, RenderPipeline, RenderedDocument};
pub use renderer::{ChromiumRenderer, HtmlRenderer, RenderOptions};
pub use store::DocumentStore;
