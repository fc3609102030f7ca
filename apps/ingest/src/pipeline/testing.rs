//! Stage fakes shared by the pipeline and handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::embed::{EmbeddingError, EmbeddingGenerator};
use crate::extract::{ExtractionError, ExtractorRegistry, TextExtractor};
use crate::index::{IndexError, SubjectKey, VectorIndexWriter};
use crate::pipeline::orchestrator::IngestPipeline;
use crate::pipeline::validation::UploadLimits;
use crate::storage::{BlobStore, MemoryBlobStore, StorageError, StoredArtifact};

/// Answers for PDF and plain text with a canned result.
#[derive(Clone)]
pub struct StubExtractor {
    result: Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl StubExtractor {
    pub fn ok(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for StubExtractor {
    fn supported_types(&self) -> &[&str] {
        &["application/pdf", "text/plain"]
    }

    async fn extract(&self, _artifact: &StoredArtifact) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(ExtractionError::Failed)
    }
}

#[derive(Clone)]
pub struct StubEmbedder {
    result: Result<Vec<f32>, (u16, String)>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl StubEmbedder {
    pub fn ok(vector: Vec<f32>) -> Self {
        Self {
            result: Ok(vector),
            delay: None,
            calls: Arc::default(),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            result: Err((status, message.to_string())),
            delay: None,
            calls: Arc::default(),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingGenerator for StubEmbedder {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result
            .clone()
            .map_err(|(status, message)| EmbeddingError::Api { status, message })
    }
}

pub struct RejectingBlobStore(pub String);

#[async_trait]
impl BlobStore for RejectingBlobStore {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn store(
        &self,
        _owner_id: Uuid,
        _bytes: Bytes,
        _file_name: &str,
        _mime_type: &str,
    ) -> Result<StoredArtifact, StorageError> {
        Err(StorageError::Rejected(self.0.clone()))
    }
}

pub struct FailingIndex;

#[async_trait]
impl VectorIndexWriter for FailingIndex {
    fn name(&self) -> &str {
        "failing"
    }

    async fn upsert(&self, _key: &SubjectKey, _vector: &[f32]) -> Result<(), IndexError> {
        Err(IndexError::Database(sqlx::Error::PoolTimedOut))
    }
}

/// Builder for pipelines wired with fakes. Defaults: in-memory store, the
/// real default extractors, no embedder, no index.
pub struct TestPipeline {
    store: Arc<dyn BlobStore>,
    extractors: ExtractorRegistry,
    embedder: Option<Arc<dyn EmbeddingGenerator>>,
    index: Option<Arc<dyn VectorIndexWriter>>,
    limits: UploadLimits,
}

impl TestPipeline {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryBlobStore::new()),
            extractors: ExtractorRegistry::with_defaults(),
            embedder: None,
            index: None,
            limits: UploadLimits::default(),
        }
    }

    pub fn store<S: BlobStore + 'static>(mut self, store: S) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn extractor<E: TextExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractors.register(extractor);
        self
    }

    pub fn embedder<E: EmbeddingGenerator + 'static>(mut self, embedder: E) -> Self {
        self.embedder = Some(Arc::new(embedder));
        self
    }

    pub fn index<I: VectorIndexWriter + 'static>(mut self, index: I) -> Self {
        self.index = Some(Arc::new(index));
        self
    }

    pub fn limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> IngestPipeline {
        let mut pipeline =
            IngestPipeline::new(self.store, Arc::new(self.extractors), self.limits);
        if let Some(embedder) = self.embedder {
            pipeline = pipeline.with_embedder(embedder);
        }
        if let Some(index) = self.index {
            pipeline = pipeline.with_index(index);
        }
        pipeline
    }
}

/// A one-page PDF showing `text` in Helvetica, with a correct xref table.
/// `text` must not contain parentheses or backslashes.
pub fn pdf_with_text(text: &str) -> Bytes {
    let content = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
    }

    let xref_at = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    Bytes::from(pdf)
}
