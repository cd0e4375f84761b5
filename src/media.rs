use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::ServiceError;

/// Filesystem store for uploaded images (menu photos, event banners,
/// the popup). Filenames are sanitized before they touch the disk and
/// served back through the static `/images` mount.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

/// Strips path components and anything outside `[A-Za-z0-9._-]` from a
/// client-supplied filename.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim_matches('.').to_string()
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists upload bytes under a sanitized name and returns the
    /// stored filename.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, ServiceError> {
        let filename = sanitize_filename(original_name);
        if filename.is_empty() {
            return Err(ServiceError::ValidationError(
                "Upload is missing a usable filename".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            ServiceError::InternalError(format!("Failed to create upload directory: {}", e))
        })?;

        let path = self.root.join(&filename);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Failed to store upload: {}", e)))?;

        info!(filename = %filename, bytes = data.len(), "stored uploaded image");
        Ok(filename)
    }

    /// Removes a stored file. A missing file is not an error; the
    /// database row is the source of truth.
    pub async fn delete(&self, filename: &str) {
        let filename = sanitize_filename(filename);
        if filename.is_empty() {
            return;
        }
        let path = self.root.join(&filename);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(filename = %filename, error = %e, "failed to remove stored image");
            }
        }
    }
}
