use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use super::{object_key, public_url, BlobStore, StorageError, StoredArtifact};

/// Filesystem blob store for local development. Keys map to paths under `root`.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: String) -> Self {
        Self {
            root: root.into(),
            public_base_url,
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn store(
        &self,
        owner_id: Uuid,
        bytes: Bytes,
        file_name: &str,
        mime_type: &str,
    ) -> Result<StoredArtifact, StorageError> {
        let key = object_key(owner_id, file_name);
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_then_rename(&path, &bytes).await?;

        info!("Stored resume for owner {owner_id} at {}", path.display());

        Ok(StoredArtifact {
            url: public_url(&self.public_base_url, &key),
            key,
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

/// Writes to a `.partial` sibling, then renames into place. A failed write
/// or rename removes the partial file before returning the error.
async fn write_then_rename(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("partial");
    let written = match tokio::fs::write(&tmp, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove {}: {e}", tmp.display());
            }
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_writes_bytes_under_owner_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://files.local".to_string());
        let owner = Uuid::new_v4();

        let artifact = store
            .store(owner, Bytes::from_static(b"hello"), "cv.txt", "text/plain")
            .await
            .unwrap();

        let on_disk = std::fs::read(dir.path().join(&artifact.key)).unwrap();
        assert_eq!(on_disk, b"hello");
        assert!(artifact.url.starts_with(&format!("http://files.local/resumes/{owner}/")));
        assert_eq!(artifact.file_name, "cv.txt");
    }

    #[tokio::test]
    async fn test_same_bytes_twice_creates_two_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://files.local".to_string());
        let owner = Uuid::new_v4();

        let a = store
            .store(owner, Bytes::from_static(b"x"), "cv.txt", "text/plain")
            .await
            .unwrap();
        let b = store
            .store(owner, Bytes::from_static(b"x"), "cv.txt", "text/plain")
            .await
            .unwrap();

        assert_ne!(a.key, b.key);
        let entries = std::fs::read_dir(dir.path().join(format!("resumes/{owner}")))
            .unwrap()
            .count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn test_unwritable_root_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file_root = dir.path().join("not-a-dir");
        std::fs::write(&file_root, b"").unwrap();
        let store = LocalBlobStore::new(&file_root, "http://files.local".to_string());

        let err = store
            .store(Uuid::new_v4(), Bytes::from_static(b"x"), "cv.txt", "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // Renaming a file over a non-empty directory fails.
        let target = dir.path().join("cv.txt");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("occupied"), b"").unwrap();

        let err = write_then_rename(&target, b"hello").await.unwrap_err();

        assert_ne!(err.kind(), std::io::ErrorKind::NotFound);
        assert!(!dir.path().join("cv.partial").exists());
        assert!(target.is_dir());
    }
}
