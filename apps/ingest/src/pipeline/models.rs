use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

/// A file as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Recognized per-request options. New flags go here with a serde default so
/// older callers keep working.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestOptions {
    pub skip_embeddings: bool,
}

/// One upload, owned by an already-authenticated subject.
/// `file` is optional so a missing upload is reported by validation.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub owner_id: Uuid,
    pub file: Option<UploadedFile>,
    pub options: IngestOptions,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage bookkeeping
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Store,
    Extract,
    Embed,
    Index,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Store => "store",
            Stage::Extract => "extract",
            Stage::Embed => "embed",
            Stage::Index => "index",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Append-only, one entry per stage per run.
#[derive(Debug, Clone, Default)]
pub struct StageLog {
    steps: Vec<StageOutcome>,
}

impl StageLog {
    pub fn record(&mut self, stage: Stage, status: StageStatus, message: Option<String>) {
        debug_assert!(
            self.status_of(stage).is_none(),
            "stage {} recorded twice",
            stage.as_str()
        );
        self.steps.push(StageOutcome {
            stage,
            status,
            message,
        });
    }

    pub fn ok(&mut self, stage: Stage) {
        self.record(stage, StageStatus::Ok, None);
    }

    pub fn skipped(&mut self, stage: Stage, reason: &str) {
        self.record(stage, StageStatus::Skipped, Some(reason.to_string()));
    }

    pub fn failed(&mut self, stage: Stage, reason: impl Into<String>) {
        self.record(stage, StageStatus::Failed, Some(reason.into()));
    }

    pub fn status_of(&self, stage: Stage) -> Option<StageStatus> {
        self.steps
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.status)
    }

    pub fn into_steps(self) -> Vec<StageOutcome> {
        self.steps
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionResult {
    pub success: bool,
    pub resume_url: Option<String>,
    pub file_name: Option<String>,
    pub extracted_text: Option<String>,
    pub has_embeddings: bool,
    pub processing_steps: Vec<StageOutcome>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl IngestionResult {
    /// Fatal outcome: nothing after the failing point was attempted.
    pub fn fatal(error: String, steps: StageLog, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            resume_url: None,
            file_name: None,
            extracted_text: None,
            has_embeddings: false,
            processing_steps: steps.into_steps(),
            warnings,
            error: Some(error),
        }
    }

    pub fn has_text_extraction(&self) -> bool {
        self.extracted_text.is_some()
    }

    #[cfg(test)]
    pub fn status_of(&self, stage: Stage) -> Option<StageStatus> {
        self.processing_steps
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.status)
    }

    pub fn into_response(self) -> IngestResponse {
        if !self.success {
            return IngestResponse::Failure(FailureBody {
                success: false,
                error: self
                    .error
                    .unwrap_or_else(|| "resume processing failed".to_string()),
                warnings: self.warnings,
            });
        }

        let has_text_extraction = self.has_text_extraction();
        IngestResponse::Success(SuccessBody {
            success: true,
            data: ResumeData {
                resume_url: self.resume_url.unwrap_or_default(),
                file_name: self.file_name.unwrap_or_default(),
                has_text_extraction,
                has_embeddings: self.has_embeddings,
                vector_search_enabled: self.has_embeddings,
                processing_steps: self.processing_steps,
            },
            warnings: self.warnings,
            message: "Resume uploaded and processed successfully".to_string(),
        })
    }
}

/// Wire shape returned to the web layer.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IngestResponse {
    Success(SuccessBody),
    Failure(FailureBody),
}

#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub data: ResumeData,
    pub warnings: Vec<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub resume_url: String,
    pub file_name: String,
    pub has_text_extraction: bool,
    pub has_embeddings: bool,
    pub vector_search_enabled: bool,
    pub processing_steps: Vec<StageOutcome>,
}

#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    pub warnings: Vec<String>,
}
