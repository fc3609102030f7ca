// Resume Ingestion Pipeline
// Validates an upload, stores it, extracts text, and optionally embeds and indexes it.
// Stage backends are injected as trait objects; see storage, extract, embed, index.

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod validation;

#[cfg(test)]
pub mod testing;

pub use orchestrator::IngestPipeline;
