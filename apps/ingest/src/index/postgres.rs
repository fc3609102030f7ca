use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::{IndexError, SubjectKey, VectorIndexWriter};

/// Postgres-backed index. `subject_key` is the primary key, so the upsert is a
/// single `INSERT .. ON CONFLICT DO UPDATE` and Postgres row locking orders
/// concurrent writers to the same subject.
#[derive(Clone)]
pub struct PgVectorIndex {
    pool: PgPool,
}

impl PgVectorIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the embeddings table if it does not exist yet.
    pub async fn init(&self) -> Result<(), IndexError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resume_embeddings (
                subject_key TEXT PRIMARY KEY,
                embedding   REAL[] NOT NULL,
                dimension   INTEGER NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        info!("resume_embeddings table ready");
        Ok(())
    }
}

#[async_trait]
impl VectorIndexWriter for PgVectorIndex {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn upsert(&self, key: &SubjectKey, vector: &[f32]) -> Result<(), IndexError> {
        if vector.is_empty() {
            return Err(IndexError::EmptyVector);
        }

        sqlx::query(
            r#"
            INSERT INTO resume_embeddings (subject_key, embedding, dimension, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (subject_key) DO UPDATE
            SET embedding = EXCLUDED.embedding,
                dimension = EXCLUDED.dimension,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(vector)
        .bind(vector.len() as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
