use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::IngestPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IngestPipeline>,
    /// Upper bound on a single ingestion run. `None` lets runs take as long as they need.
    pub request_deadline: Option<Duration>,
}
