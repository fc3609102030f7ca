use async_trait::async_trait;

use super::{ExtractionError, TextExtractor};
use crate::storage::StoredArtifact;

/// Plain-text resumes. Invalid UTF-8 is replaced rather than rejected.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn supported_types(&self) -> &[&str] {
        &["text/plain", "text/markdown"]
    }

    async fn extract(&self, artifact: &StoredArtifact) -> Result<String, ExtractionError> {
        let text = String::from_utf8_lossy(&artifact.bytes);
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}
