//! Content-addressed document store
//!
//! A directory of `<id>.pdf` files keyed by document id. Writes are
//! keyed by content digest, so overwrite-on-existing is the defined
//! behavior and no locking is needed; collisions are rare and accepted.

use std::path::{Path, PathBuf};

use docgen_core::identity::is_valid_document_id;

use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist document bytes under `id`, creating the store directory if
    /// absent. Existing content under the same id is overwritten.
    pub async fn save(&self, id: &str, bytes: &[u8]) -> Result<(), EngineError> {
        let path = self.document_path(id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(document_id = %id, bytes = bytes.len(), "document stored");
        Ok(())
    }

    /// Retrieve previously stored bytes, bit-exact.
    pub async fn retrieve(&self, id: &str) -> Result<Vec<u8>, EngineError> {
        let path = self.document_path(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::DocumentNotFound(id.to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Ids must match the derived-id shape exactly; anything else never
    /// touches the filesystem.
    fn document_path(&self, id: &str) -> Result<PathBuf, EngineError> {
        if !is_valid_document_id(id) {
            return Err(EngineError::DocumentNotFound(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.pdf")))
    }
}
