use async_trait::async_trait;
use tracing::debug;

use super::{ExtractionError, TextExtractor};
use crate::storage::StoredArtifact;

/// PDF text extraction via `pdf-extract`. Runs on the blocking pool since
/// parsing is CPU-bound and can take a while on large scanned resumes.
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn supported_types(&self) -> &[&str] {
        &["application/pdf", "application/x-pdf"]
    }

    async fn extract(&self, artifact: &StoredArtifact) -> Result<String, ExtractionError> {
        debug!("Extracting PDF text from {}", artifact.key);

        let bytes = artifact.bytes.clone();
        // pdf-extract panics on some malformed inputs; a panic surfaces as a join error.
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractionError::Failed(format!("PDF parser aborted: {e}")))?
            .map_err(|e| ExtractionError::Failed(format!("PDF extraction failed: {e}")))
    }
}
