use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{IndexError, SubjectKey, VectorIndexWriter};

#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone)]
pub struct IndexedVector {
    pub vector: Vec<f32>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory index for development and tests. The write lock serializes
/// upserts, which is enough to make same-key writes last-writer-wins.
#[derive(Clone, Default)]
pub struct MemoryVectorIndex {
    entries: Arc<RwLock<HashMap<SubjectKey, IndexedVector>>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get(&self, key: &SubjectKey) -> Option<IndexedVector> {
        self.entries.read().await.get(key).cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl VectorIndexWriter for MemoryVectorIndex {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upsert(&self, key: &SubjectKey, vector: &[f32]) -> Result<(), IndexError> {
        if vector.is_empty() {
            return Err(IndexError::EmptyVector);
        }
        self.entries.write().await.insert(
            key.clone(),
            IndexedVector {
                vector: vector.to_vec(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}
