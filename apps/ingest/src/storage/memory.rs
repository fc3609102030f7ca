use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{object_key, public_url, BlobStore, StorageError, StoredArtifact};

/// In-memory blob store. Used by tests and when no durable backend is wanted.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn store(
        &self,
        owner_id: Uuid,
        bytes: Bytes,
        file_name: &str,
        mime_type: &str,
    ) -> Result<StoredArtifact, StorageError> {
        let key = object_key(owner_id, file_name);
        self.objects.write().await.insert(key.clone(), bytes.clone());
        Ok(StoredArtifact {
            url: public_url("memory://blobs", &key),
            key,
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}
