//! services/api/src/adapters/uploads.rs
//!
//! Local-filesystem storage for uploaded book PDFs and cover pictures.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

/// Writes uploads into a single directory and resolves stored names back to paths.
#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves `data` under a prefixed version of `original_name` and returns the stored name.
    pub async fn save(&self, original_name: &str, data: Bytes) -> std::io::Result<String> {
        let stored = stored_name(original_name);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&stored), &data).await?;
        info!("Stored upload '{}' ({} bytes)", stored, data.len());
        Ok(stored)
    }

    /// Resolves a stored name to a path inside the upload directory.
    ///
    /// Returns `None` for blank names or names that try to leave the directory.
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        let name = final_component(stored)?;
        if name != stored.trim() {
            return None;
        }
        Some(self.dir.join(name))
    }
}

fn final_component(name: &str) -> Option<&str> {
    let name = name
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// Reduces an uploaded file name to its last path component and adds a short random prefix.
pub fn stored_name(original_name: &str) -> String {
    let prefix = Uuid::new_v4().simple().to_string();
    let base = final_component(original_name).unwrap_or("upload");
    format!("{}_{}", &prefix[..8], base)
}
