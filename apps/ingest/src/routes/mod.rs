pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

/// Headroom over the upload limit for multipart framing and the other form fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    // Oversized files must reach validation so they get the structured error.
    let body_limit = state
        .pipeline
        .limits()
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resumes/upload",
            post(handlers::handle_upload_resume).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
