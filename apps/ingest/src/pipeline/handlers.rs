//! Axum route handler for resume uploads.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::QueryRejection,
        Multipart, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::time::Instant;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::models::{IngestOptions, IngestionRequest, UploadedFile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Pre-authenticated owner; identity is resolved upstream.
    pub user_id: Uuid,
}

/// POST /api/v1/resumes/upload
///
/// Multipart form: `file` (required by validation) and `skip_embeddings` (optional).
/// 200 with the full payload when the resume was stored, 400 with
/// `{error, warnings}` otherwise. A missing or malformed `user_id`, or a body
/// that is not multipart, is a `VALIDATION_ERROR`.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    params: Result<Query<UploadQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let Query(params) =
        params.map_err(|e| AppError::Validation(format!("invalid user_id: {}", e.body_text())))?;
    let mut multipart = multipart
        .map_err(|e| AppError::Validation(format!("expected a multipart form: {}", e.body_text())))?;
    let mut file = None;
    let mut options = IngestOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read file: {e}")))?;
                file = Some(UploadedFile {
                    name: file_name,
                    mime_type,
                    bytes,
                });
            }
            Some("skip_embeddings") | Some("skipEmbeddings") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read field: {e}")))?;
                options.skip_embeddings = parse_flag(&value)?;
            }
            _ => {}
        }
    }

    let request = IngestionRequest {
        owner_id: params.user_id,
        file,
        options,
    };
    let result = match state.request_deadline {
        Some(budget) => {
            state
                .pipeline
                .run_with_deadline(request, Instant::now() + budget)
                .await
        }
        None => state.pipeline.run(request).await,
    };

    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(result.into_response())).into_response())
}

fn parse_flag(value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        other => Err(AppError::Validation(format!(
            "skip_embeddings must be a boolean, got '{other}'"
        ))),
    }
}
