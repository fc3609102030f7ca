//! Vector Index Writer: one embedding per subject, replaced on re-ingestion.
//!
//! Backends must linearize concurrent upserts to the same key (last writer
//! wins) while leaving different keys independent.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
pub mod redis_store;

pub use memory::MemoryVectorIndex;
pub use postgres::PgVectorIndex;
pub use redis_store::RedisVectorIndex;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("refusing to index an empty vector")]
    EmptyVector,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key a resume embedding is indexed under. Currently one per candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self(format!("resume:{owner_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait VectorIndexWriter: Send + Sync {
    fn name(&self) -> &str;

    /// Inserts or replaces the vector stored under `key`.
    async fn upsert(&self, key: &SubjectKey, vector: &[f32]) -> Result<(), IndexError>;
}
