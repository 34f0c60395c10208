//! Core document-generation logic
//!
//! This crate holds the pure parts of the docgen service:
//! - Structure analysis of sample JSON documents (variables, conditionals,
//!   arrays with nested-array detection)
//! - Complexity classification of analyzed structures
//! - Deterministic document identity derivation (content addressing)
//!
//! Everything here is side-effect free apart from diagnostic logging, so the
//! HTTP layer and render pipeline can be tested against it in isolation.

pub mod complexity;
pub mod identity;
pub mod structure;

pub use complexity::{classify, Complexity};
pub use identity::{derive_document_id, is_valid_document_id, DOCUMENT_ID_LEN};
pub use structure::{analyze, ArrayDescriptor, StructureReport, CONTEXTUAL_VALUE};
