use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::embed::OversizePolicy;
use crate::pipeline::validation::{DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_UPLOAD_BYTES};

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_MAX_INPUT_CHARS: usize = 8000;

#[derive(Debug, Clone)]
pub enum BlobBackend {
    S3 {
        bucket: String,
        endpoint: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
        public_base_url: String,
    },
    Local {
        root: String,
        public_base_url: String,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexBackend {
    Postgres { database_url: String },
    Redis { redis_url: String },
    Memory,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: Option<usize>,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected backends is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub blob: BlobBackend,
    pub index: IndexBackend,
    /// `None` when `EMBEDDING_API_URL` is unset; embedding is then reported as unavailable.
    pub embedding: Option<EmbeddingSettings>,
    pub embedding_max_input_chars: usize,
    pub embedding_oversize_policy: OversizePolicy,
    pub max_upload_bytes: usize,
    pub allowed_mime_types: Vec<String>,
    pub request_deadline: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be tested without
    /// touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let blob = match var("BLOB_BACKEND").as_deref().unwrap_or("s3") {
            "s3" => {
                let bucket = require("S3_BUCKET")?;
                let endpoint = require("S3_ENDPOINT")?;
                let public_base_url = var("S3_PUBLIC_BASE_URL").unwrap_or_else(|| {
                    format!("{}/{}", endpoint.trim_end_matches('/'), bucket)
                });
                BlobBackend::S3 {
                    region: var("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                    access_key_id: require("AWS_ACCESS_KEY_ID")?,
                    secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
                    bucket,
                    endpoint,
                    public_base_url,
                }
            }
            "local" => BlobBackend::Local {
                root: require("BLOB_DIR")?,
                public_base_url: require("BLOB_PUBLIC_BASE_URL")?,
            },
            "memory" => BlobBackend::Memory,
            other => {
                return Err(anyhow!(
                    "BLOB_BACKEND must be one of s3, local, memory; got '{other}'"
                ))
            }
        };

        let index = match var("VECTOR_INDEX_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => IndexBackend::Postgres {
                database_url: require("DATABASE_URL")?,
            },
            "redis" => IndexBackend::Redis {
                redis_url: require("REDIS_URL")?,
            },
            "memory" => IndexBackend::Memory,
            "none" => IndexBackend::Disabled,
            other => {
                return Err(anyhow!(
                    "VECTOR_INDEX_BACKEND must be one of postgres, redis, memory, none; got '{other}'"
                ))
            }
        };

        let embedding = match var("EMBEDDING_API_URL") {
            Some(api_url) => Some(EmbeddingSettings {
                api_url,
                api_key: var("EMBEDDING_API_KEY"),
                model: var("EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                dimension: parse_opt(&var, "EMBEDDING_DIMENSION")?,
            }),
            None => None,
        };

        let allowed_mime_types = match var("ALLOWED_MIME_TYPES") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        Ok(Config {
            port: parse_opt(&var, "PORT")?.unwrap_or(8080),
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            blob,
            index,
            embedding,
            embedding_max_input_chars: parse_opt(&var, "EMBEDDING_MAX_INPUT_CHARS")?
                .unwrap_or(DEFAULT_EMBEDDING_MAX_INPUT_CHARS),
            embedding_oversize_policy: var("EMBEDDING_OVERSIZE_POLICY")
                .map(|v| v.parse::<OversizePolicy>())
                .transpose()
                .map_err(|e| anyhow!("EMBEDDING_OVERSIZE_POLICY: {e}"))?
                .unwrap_or_default(),
            max_upload_bytes: parse_opt(&var, "MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            allowed_mime_types,
            request_deadline: parse_opt::<u64>(&var, "PIPELINE_DEADLINE_SECS")?
                .map(Duration::from_secs),
        })
    }
}

fn parse_opt<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key)
        .map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{key} has an invalid value"))
}
