use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{IndexError, SubjectKey, VectorIndexWriter};

const KEY_PREFIX: &str = "vectors:";

/// Redis-backed index: one string value (JSON array) per subject. `SET` is
/// atomic, so the last write to a key wins.
#[derive(Clone)]
pub struct RedisVectorIndex {
    conn: ConnectionManager,
}

impl RedisVectorIndex {
    /// Opens one managed connection, shared by every upsert and re-established
    /// on failure.
    pub async fn connect(client: redis::Client) -> Result<Self, IndexError> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    pub fn storage_key(key: &SubjectKey) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl VectorIndexWriter for RedisVectorIndex {
    fn name(&self) -> &str {
        "redis"
    }

    async fn upsert(&self, key: &SubjectKey, vector: &[f32]) -> Result<(), IndexError> {
        if vector.is_empty() {
            return Err(IndexError::EmptyVector);
        }
        let payload = serde_json::to_string(vector)?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(Self::storage_key(key), payload).await?;
        Ok(())
    }
}
