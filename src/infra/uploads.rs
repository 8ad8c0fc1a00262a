//! Filesystem storage for post images.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

const POSTS_SUBDIR: &str = "posts";
const DEFAULT_EXTENSION: &str = "bin";

#[derive(Debug, Error)]
pub enum UploadStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error("uploaded file is empty")]
    EmptyPayload,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Filesystem-backed image storage rooted at the configured media directory.
/// Stored paths are relative (`posts/<uuid>.<ext>`) and are what the post
/// rows reference.
#[derive(Debug)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Initialise storage rooted at the provided directory, creating it if
    /// necessary.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store an image payload and return the relative path to record.
    pub async fn store_image(
        &self,
        original_name: Option<&str>,
        data: Bytes,
    ) -> Result<String, UploadStorageError> {
        if data.is_empty() {
            return Err(UploadStorageError::EmptyPayload);
        }

        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or(DEFAULT_EXTENSION)
            .to_ascii_lowercase();

        let stored_path = format!("{POSTS_SUBDIR}/{}.{extension}", Uuid::new_v4());
        let absolute = self.resolve(&stored_path)?;

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&absolute).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        Ok(stored_path)
    }

    /// Resolve a stored relative path against the root, rejecting anything
    /// that would escape it.
    pub fn resolve(&self, stored_path: &str) -> Result<PathBuf, UploadStorageError> {
        let relative = Path::new(stored_path);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !safe || relative.is_absolute() {
            return Err(UploadStorageError::InvalidPath);
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, UploadStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = UploadStorage::new(dir.path().to_path_buf()).expect("storage");
        (dir, storage)
    }

    #[tokio::test]
    async fn stores_image_under_posts_subdir() {
        let (_dir, storage) = storage();
        let stored = storage
            .store_image(Some("cat.PNG"), Bytes::from_static(b"imagedata"))
            .await
            .expect("stored");

        assert!(stored.starts_with("posts/"));
        assert!(stored.ends_with(".png"));

        let absolute = storage.resolve(&stored).expect("resolved");
        assert_eq!(std::fs::read(absolute).expect("read back"), b"imagedata");
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let (_dir, storage) = storage();
        let err = storage
            .store_image(Some("cat.png"), Bytes::new())
            .await
            .expect_err("empty rejected");
        assert!(matches!(err, UploadStorageError::EmptyPayload));
    }

    #[test]
    fn traversal_paths_are_rejected() {
        let (_dir, storage) = storage();
        assert!(storage.resolve("../outside.png").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("posts/ok.png").is_ok());
    }
}
