mod config;
mod db;
mod embed;
mod errors;
mod extract;
mod index;
mod pipeline;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{BlobBackend, Config, IndexBackend};
use crate::db::create_pool;
use crate::embed::http::HttpEmbeddingConfig;
use crate::embed::HttpEmbeddingClient;
use crate::extract::ExtractorRegistry;
use crate::index::{MemoryVectorIndex, PgVectorIndex, RedisVectorIndex, VectorIndexWriter};
use crate::pipeline::validation::UploadLimits;
use crate::pipeline::IngestPipeline;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{BlobStore, LocalBlobStore, MemoryBlobStore, S3BlobStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume ingest service v{}", env!("CARGO_PKG_VERSION"));

    let blob_store = build_blob_store(&config).await;
    info!("Blob store initialized ({})", blob_store.name());

    let extractors = ExtractorRegistry::with_defaults();
    for mime in &config.allowed_mime_types {
        if !extractors.supports(mime) {
            warn!("No text extractor for {mime}; such uploads are stored without text");
        }
    }

    let mut pipeline = IngestPipeline::new(
        blob_store,
        Arc::new(extractors),
        UploadLimits {
            max_bytes: config.max_upload_bytes,
            allowed_mime_types: config.allowed_mime_types.clone(),
        },
    );

    match &config.embedding {
        Some(settings) => {
            let client = HttpEmbeddingClient::new(HttpEmbeddingConfig {
                base_url: settings.api_url.clone(),
                api_key: settings.api_key.clone(),
                model: settings.model.clone(),
                dimension: settings.dimension,
                max_input_chars: config.embedding_max_input_chars,
                oversize_policy: config.embedding_oversize_policy,
            })?;
            info!("Embedding client initialized (model: {})", settings.model);
            pipeline = pipeline.with_embedder(Arc::new(client));
        }
        None => warn!("EMBEDDING_API_URL not set; uploads will be stored without embeddings"),
    }

    match build_vector_index(&config).await? {
        Some(index) => {
            info!("Vector index initialized ({})", index.name());
            pipeline = pipeline.with_index(index);
        }
        None => warn!("Vector index disabled; resumes will not be searchable"),
    }

    let state = AppState {
        pipeline: Arc::new(pipeline),
        request_deadline: config.request_deadline,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the recruitment frontend

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the blob store for the configured backend: S3 / MinIO or a local directory.
async fn build_blob_store(config: &Config) -> Arc<dyn BlobStore> {
    match &config.blob {
        BlobBackend::S3 {
            bucket,
            endpoint,
            region,
            access_key_id,
            secret_access_key,
            public_base_url,
        } => {
            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "resume-ingest-static",
            );

            let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .credentials_provider(credentials)
                .endpoint_url(endpoint)
                .load()
                .await;

            // MinIO serves buckets by path, not by virtual host.
            let s3_config = aws_sdk_s3::config::Builder::from(&shared)
                .force_path_style(true)
                .build();

            Arc::new(S3BlobStore::new(
                aws_sdk_s3::Client::from_conf(s3_config),
                bucket.clone(),
                public_base_url.clone(),
            ))
        }
        BlobBackend::Local {
            root,
            public_base_url,
        } => Arc::new(LocalBlobStore::new(root, public_base_url.clone())),
        BlobBackend::Memory => {
            warn!("Using in-memory blob store; uploaded resumes are lost on restart");
            Arc::new(MemoryBlobStore::new())
        }
    }
}

async fn build_vector_index(config: &Config) -> Result<Option<Arc<dyn VectorIndexWriter>>> {
    let index: Arc<dyn VectorIndexWriter> = match &config.index {
        IndexBackend::Postgres { database_url } => {
            let index = PgVectorIndex::new(create_pool(database_url).await?);
            index.init().await?;
            Arc::new(index)
        }
        IndexBackend::Redis { redis_url } => {
            let client = redis::Client::open(redis_url.as_str())?;
            Arc::new(RedisVectorIndex::connect(client).await?)
        }
        IndexBackend::Memory => Arc::new(MemoryVectorIndex::new()),
        IndexBackend::Disabled => return Ok(None),
    };
    Ok(Some(index))
}
