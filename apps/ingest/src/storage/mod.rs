//! Blob Store Adapter: durable, owner-scoped persistence of uploaded resume bytes.
//!
//! Every backend writes a fresh object per call. There is no content-hash
//! deduplication: uploading the same bytes twice yields two artifacts.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

pub mod local;
pub mod memory;
pub mod s3;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage write rejected: {0}")]
    Rejected(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reference to a document that has been durably written.
///
/// Carries the bytes alongside the location so downstream stages never have to
/// read the artifact back from the backend.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub key: String,
    pub url: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    async fn store(
        &self,
        owner_id: Uuid,
        bytes: Bytes,
        file_name: &str,
        mime_type: &str,
    ) -> Result<StoredArtifact, StorageError>;
}

/// Builds the object key `resumes/<owner>/<uuid>-<file name>`.
pub fn object_key(owner_id: Uuid, file_name: &str) -> String {
    format!(
        "resumes/{}/{}-{}",
        owner_id,
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}

/// Replaces anything outside `[A-Za-z0-9._-]` so the name is safe in a key or path.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name)
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Joins a public base URL and an object key with exactly one slash.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
