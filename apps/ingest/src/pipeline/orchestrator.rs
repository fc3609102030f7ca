//! Pipeline Orchestrator: store → extract → embed → index, one attempt each.
//!
//! Failure policy:
//! - validation and `store` are fatal: the run stops and `error` is set.
//! - `extract`, `embed`, `index` are degraded: the step is marked `failed`,
//!   a warning is appended, and the run continues with less.
//! - an expired caller deadline is fatal at whatever stage it interrupts.
//!
//! `run` never returns an error; every outcome is an `IngestionResult`.

use std::future::Future;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::embed::EmbeddingGenerator;
use crate::extract::{ExtractionError, ExtractorRegistry};
use crate::index::{SubjectKey, VectorIndexWriter};
use crate::pipeline::models::{IngestionRequest, IngestionResult, Stage, StageLog};
use crate::pipeline::validation::{validate_upload, UploadLimits};
use crate::storage::{BlobStore, StoredArtifact};

/// Deadline expired while a stage was in flight.
struct Cancelled;

pub struct IngestPipeline {
    blob_store: Arc<dyn BlobStore>,
    extractors: Arc<ExtractorRegistry>,
    embedder: Option<Arc<dyn EmbeddingGenerator>>,
    index: Option<Arc<dyn VectorIndexWriter>>,
    limits: UploadLimits,
}

impl IngestPipeline {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        extractors: Arc<ExtractorRegistry>,
        limits: UploadLimits,
    ) -> Self {
        Self {
            blob_store,
            extractors,
            embedder: None,
            index: None,
            limits,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingGenerator>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_index(mut self, index: Arc<dyn VectorIndexWriter>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub async fn run(&self, request: IngestionRequest) -> IngestionResult {
        self.execute(request, None).await
    }

    /// Like `run`, but gives up once `deadline` passes.
    pub async fn run_with_deadline(
        &self,
        request: IngestionRequest,
        deadline: Instant,
    ) -> IngestionResult {
        self.execute(request, Some(deadline)).await
    }

    async fn execute(&self, request: IngestionRequest, deadline: Option<Instant>) -> IngestionResult {
        let owner_id = request.owner_id;
        let mut steps = StageLog::default();
        let mut warnings = Vec::new();

        let file = match validate_upload(request.file.as_ref(), &self.limits) {
            Ok(file) => file,
            Err(e) => {
                warn!("Rejected resume upload for owner {owner_id}: {e}");
                return IngestionResult::fatal(format!("validation failed: {e}"), steps, warnings);
            }
        };

        // 1. Store (fatal)
        let stored = bounded(
            deadline,
            self.blob_store
                .store(owner_id, file.bytes.clone(), &file.name, &file.mime_type),
        )
        .await;
        let artifact: StoredArtifact = match stored {
            Err(Cancelled) => return cancelled(Stage::Store, steps, warnings),
            Ok(Err(e)) => {
                error!(
                    "Storing resume for owner {owner_id} via {} failed: {e}",
                    self.blob_store.name()
                );
                steps.failed(Stage::Store, e.to_string());
                return IngestionResult::fatal(e.to_string(), steps, warnings);
            }
            Ok(Ok(artifact)) => {
                steps.ok(Stage::Store);
                artifact
            }
        };

        // 2. Extract (degraded)
        let extracted_text = match bounded(deadline, self.extractors.extract(&artifact)).await {
            Err(Cancelled) => return cancelled(Stage::Extract, steps, warnings),
            Ok(Ok(text)) => {
                info!(
                    "Extracted {} chars from {} for owner {owner_id}",
                    text.chars().count(),
                    artifact.key
                );
                steps.ok(Stage::Extract);
                Some(text)
            }
            Ok(Err(e)) => {
                warn!("Text extraction for {} failed: {e}", artifact.key);
                warnings.push(extraction_warning(&e));
                steps.failed(Stage::Extract, e.to_string());
                None
            }
        };

        // 3. Embed (skippable, then degraded)
        let vector = match (&extracted_text, request.options.skip_embeddings) {
            (_, true) => {
                steps.skipped(Stage::Embed, "embeddings skipped by request");
                None
            }
            (None, false) => {
                steps.skipped(Stage::Embed, "no extracted text");
                None
            }
            (Some(text), false) => match &self.embedder {
                None => {
                    warnings.push(
                        "embedding generation unavailable, continuing without vector search"
                            .to_string(),
                    );
                    steps.failed(Stage::Embed, "no embedding generator configured");
                    None
                }
                Some(embedder) => match bounded(deadline, embedder.embed(text)).await {
                    Err(Cancelled) => return cancelled(Stage::Embed, steps, warnings),
                    Ok(Ok(vector)) => {
                        info!(
                            "Generated {}-dim embedding with {} for owner {owner_id}",
                            vector.len(),
                            embedder.model_name()
                        );
                        steps.ok(Stage::Embed);
                        Some(vector)
                    }
                    Ok(Err(e)) => {
                        warn!("Embedding generation for owner {owner_id} failed: {e}");
                        warnings.push(format!(
                            "embedding generation failed, continuing without vector search: {e}"
                        ));
                        steps.failed(Stage::Embed, e.to_string());
                        None
                    }
                },
            },
        };

        // 4. Index (degraded, only with a vector)
        let mut has_embeddings = false;
        if let Some(vector) = vector {
            let key = SubjectKey::for_owner(owner_id);
            match &self.index {
                None => {
                    warnings.push(
                        "vector index unavailable, resume will not appear in search".to_string(),
                    );
                    steps.failed(Stage::Index, "no vector index configured");
                }
                Some(index) => match bounded(deadline, index.upsert(&key, &vector)).await {
                    Err(Cancelled) => return cancelled(Stage::Index, steps, warnings),
                    Ok(Ok(())) => {
                        info!("Indexed embedding under {key} in {}", index.name());
                        steps.ok(Stage::Index);
                        has_embeddings = true;
                    }
                    Ok(Err(e)) => {
                        warn!("Vector index write for {key} failed: {e}");
                        warnings.push(format!(
                            "vector index update failed, resume will not appear in search: {e}"
                        ));
                        steps.failed(Stage::Index, e.to_string());
                    }
                },
            }
        }

        info!(
            "Resume ingestion for owner {owner_id} finished with {} warning(s)",
            warnings.len()
        );

        IngestionResult {
            success: true,
            resume_url: Some(artifact.url),
            file_name: Some(artifact.file_name),
            extracted_text,
            has_embeddings,
            processing_steps: steps.into_steps(),
            warnings,
            error: None,
        }
    }
}

async fn bounded<F: Future>(deadline: Option<Instant>, fut: F) -> Result<F::Output, Cancelled> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut)
            .await
            .map_err(|_| Cancelled),
        None => Ok(fut.await),
    }
}

fn cancelled(stage: Stage, mut steps: StageLog, warnings: Vec<String>) -> IngestionResult {
    error!("Resume ingestion cancelled during {} stage", stage.as_str());
    steps.failed(stage, "cancelled");
    IngestionResult::fatal(
        format!(
            "request cancelled: deadline exceeded during {}",
            stage.as_str()
        ),
        steps,
        warnings,
    )
}

fn extraction_warning(e: &ExtractionError) -> String {
    match e {
        ExtractionError::UnsupportedFormat(mime) => {
            format!("text extraction is not supported for {mime}, continuing without text")
        }
        other => format!("text extraction unavailable, continuing without text: {other}"),
    }
}
