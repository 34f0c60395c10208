//! Filesystem-backed template catalog
//!
//! Templates are `<name>.html` files in a single directory; an optional
//! sibling `<name>.json` holds the template's sample document. Source is
//! re-read from disk on every call so template edits take effect on the next
//! request without a restart.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::EngineError;

const TEMPLATE_EXT: &str = "html";
const SAMPLE_EXT: &str = "json";

/// One template as reported by the listing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub name: String,
    pub has_sample: bool,
    /// Template source size in bytes.
    pub size: u64,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    root: PathBuf,
}

impl TemplateCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True iff a template source file named `name` is present.
    ///
    /// Names that could escape the template directory (separators, `..`,
    /// empty) are treated as absent.
    pub fn exists(&self, name: &str) -> bool {
        is_safe_name(name) && self.template_path(name).is_file()
    }

    /// Enumerate all templates, sorted by name for a stable listing.
    pub fn list(&self) -> Result<Vec<TemplateDescriptor>, EngineError> {
        let mut templates = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXT) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            templates.push(self.describe_file(name, &path)?);
        }
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    /// Metadata for a single template.
    pub fn describe(&self, name: &str) -> Result<TemplateDescriptor, EngineError> {
        if !self.exists(name) {
            return Err(EngineError::TemplateNotFound(name.to_string()));
        }
        self.describe_file(name, &self.template_path(name))
    }

    /// Load the template source. Always reads current on-disk content, so
    /// edits are visible on the next call.
    pub fn load_source(&self, name: &str) -> Result<String, EngineError> {
        if !self.exists(name) {
            return Err(EngineError::TemplateNotFound(name.to_string()));
        }
        Ok(std::fs::read_to_string(self.template_path(name))?)
    }

    /// Load the template's sample document.
    ///
    /// Never fails: a missing sample yields the placeholder object
    /// `{ "title": "Sample data for <name>", "generated_sample": true }`,
    /// and a present-but-unreadable sample yields the same placeholder with
    /// an added `sample_error` field after logging a warning.
    pub fn load_sample(&self, name: &str) -> Value {
        if !is_safe_name(name) {
            return placeholder_sample(name);
        }
        let path = self.sample_path(name);
        if !path.is_file() {
            tracing::debug!(template = %name, "no sample file, using placeholder");
            return placeholder_sample(name);
        }
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(template = %name, %error, "failed to read sample file");
                return annotated_placeholder(name, &error.to_string());
            }
        };
        match serde_json::from_str(&text) {
            Ok(sample) => sample,
            Err(error) => {
                tracing::warn!(template = %name, %error, "sample file is not valid JSON");
                annotated_placeholder(name, &error.to_string())
            }
        }
    }

    fn describe_file(&self, name: &str, path: &Path) -> Result<TemplateDescriptor, EngineError> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok(TemplateDescriptor {
            name: name.to_string(),
            has_sample: self.sample_path(name).is_file(),
            size: metadata.len(),
            modified,
        })
    }

    fn template_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{TEMPLATE_EXT}"))
    }

    fn sample_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{SAMPLE_EXT}"))
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

fn placeholder_sample(name: &str) -> Value {
    json!({
        "title": format!("Sample data for {name}"),
        "generated_sample": true,
    })
}

fn annotated_placeholder(name: &str, message: &str) -> Value {
    json!({
        "title": format!("Sample data for {name}"),
        "generated_sample": true,
        "sample_error": message,
    })
}
