//! Text Extractor: converts a stored resume into plain text.
//!
//! One `TextExtractor` per supported format, registered by MIME type in an
//! `ExtractorRegistry`. Anything the registry does not know resolves to
//! `UnsupportedExtractor`, which fails with `ExtractionError::UnsupportedFormat`
//! so callers can tell "we can't read this kind of file" apart from a broken
//! engine.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::StoredArtifact;

pub mod pdf;
pub mod text;

pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("document contains no extractable text")]
    NoText,

    #[error("extraction failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// MIME types this extractor handles.
    fn supported_types(&self) -> &[&str];

    async fn extract(&self, artifact: &StoredArtifact) -> Result<String, ExtractionError>;
}

/// Sentinel for formats with no registered extractor.
pub struct UnsupportedExtractor;

#[async_trait]
impl TextExtractor for UnsupportedExtractor {
    fn supported_types(&self) -> &[&str] {
        &[]
    }

    async fn extract(&self, artifact: &StoredArtifact) -> Result<String, ExtractionError> {
        Err(ExtractionError::UnsupportedFormat(artifact.mime_type.clone()))
    }
}

pub struct ExtractorRegistry {
    by_mime: HashMap<String, Arc<dyn TextExtractor>>,
    unsupported: Arc<dyn TextExtractor>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            by_mime: HashMap::new(),
            unsupported: Arc::new(UnsupportedExtractor),
        }
    }

    /// Registry with the PDF and plain-text extractors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PdfExtractor);
        registry.register(PlainTextExtractor);
        registry
    }

    pub fn register<E: TextExtractor + 'static>(&mut self, extractor: E) {
        let extractor: Arc<dyn TextExtractor> = Arc::new(extractor);
        for mime in extractor.supported_types() {
            self.by_mime
                .insert(mime.to_ascii_lowercase(), Arc::clone(&extractor));
        }
    }

    /// Resolves an extractor for a MIME type. Parameters such as `; charset=utf-8`
    /// are ignored. Never fails: unknown types get the unsupported sentinel.
    pub fn resolve(&self, mime_type: &str) -> Arc<dyn TextExtractor> {
        self.by_mime
            .get(&essence(mime_type))
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.unsupported))
    }

    pub fn supports(&self, mime_type: &str) -> bool {
        self.by_mime.contains_key(&essence(mime_type))
    }

    /// Extracts text and rejects whitespace-only output.
    pub async fn extract(&self, artifact: &StoredArtifact) -> Result<String, ExtractionError> {
        let text = self.resolve(&artifact.mime_type).extract(artifact).await?;
        if text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(text)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// `"Text/Plain; charset=utf-8"` -> `"text/plain"`.
pub fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
