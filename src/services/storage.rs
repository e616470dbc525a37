//! Attachment byte storage on the local filesystem.
//!
//! Files land under `<data_dir>/attachments/<year>/<month>/` with a
//! generated name; everything above this service only ever sees the
//! `(filename, relative_path)` tuple.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Location of a stored file, as persisted on the attachment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub relative_path: String,
}

/// Filesystem-backed attachment storage rooted at the configured data dir.
#[derive(Debug, Clone)]
pub struct AttachmentStorage {
    root: PathBuf,
}

impl AttachmentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist `bytes`, deriving the stored name from a fresh UUID plus the
    /// sanitized extension of the original filename.
    pub async fn save(&self, original_filename: &str, bytes: &[u8]) -> AppResult<StoredFile> {
        let now = Utc::now();
        let relative_path = format!("attachments/{:04}/{:02}", now.year(), now.month());

        let filename = match sanitized_extension(original_filename) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let dir = self.root.join(&relative_path);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create storage directory: {}", e)))?;

        tokio::fs::write(dir.join(&filename), bytes)
            .await
            .map_err(|e| AppError::Database(format!("Failed to write attachment: {}", e)))?;

        Ok(StoredFile {
            filename,
            relative_path,
        })
    }

    /// Absolute path for a stored tuple. Rejects tuples that would escape
    /// the storage root.
    pub fn resolve(&self, filename: &str, relative_path: &str) -> AppResult<PathBuf> {
        if !is_safe_component(filename) || !relative_path.split('/').all(is_safe_component) {
            return Err(AppError::InvalidInput(
                "Invalid attachment path".to_string(),
            ));
        }
        Ok(self.root.join(relative_path).join(filename))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Lowercased alphanumeric extension, if the original name has a usable one.
fn sanitized_extension(original: &str) -> Option<String> {
    let ext = Path::new(original).extension()?.to_str()?;
    if ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

fn is_safe_component(part: &str) -> bool {
    !part.is_empty()
        && part != "."
        && part != ".."
        && !part.contains(['/', '\\', ':'])
        && !part.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_resolve_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AttachmentStorage::new(dir.path());

        let stored = storage.save("screenshot.PNG", b"fake-png").await.unwrap();
        assert!(stored.filename.ends_with(".png"));
        assert!(stored.relative_path.starts_with("attachments/"));

        let path = storage
            .resolve(&stored.filename, &stored.relative_path)
            .unwrap();
        assert_eq!(tokio::fs::read(path).await.unwrap(), b"fake-png");
    }

    #[tokio::test]
    async fn test_weird_extension_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AttachmentStorage::new(dir.path());

        let stored = storage.save("noext", b"x").await.unwrap();
        assert!(!stored.filename.contains('.'));

        let stored = storage.save("evil.p/../ng", b"x").await.unwrap();
        assert!(!stored.filename.contains('/'));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let storage = AttachmentStorage::new("/srv/data");
        assert!(storage.resolve("..", "attachments/2026/08").is_err());
        assert!(storage.resolve("a/../../b.png", "attachments/2026/08").is_err());
        assert!(storage.resolve("a.png", "attachments/../..").is_err());
        assert!(storage.resolve("a.png", "attachments/2026/08").is_ok());
    }
}
