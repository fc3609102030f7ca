//! Embedding Generator: turns extracted resume text into a single vector.
//!
//! The model behind it is a black box. What this module owns is the input
//! bound: text longer than `max_input_chars` is either truncated on a char
//! boundary or rejected with `EmbeddingError::InputTooLong`, per
//! `OversizePolicy`. Oversized input never reaches the model.

use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

pub mod http;

pub use http::HttpEmbeddingClient;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("input too long: {len} chars exceeds limit of {max}")]
    InputTooLong { len: usize, max: usize },

    #[error("embedding input is empty")]
    EmptyInput,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding response contained no vector")]
    EmptyResponse,

    #[error("expected {expected}-dimensional embedding, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OversizePolicy {
    #[default]
    Truncate,
    Reject,
}

impl FromStr for OversizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truncate" => Ok(Self::Truncate),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown oversize policy '{other}'")),
        }
    }
}

#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Applies the input bound. Returns the (possibly truncated) slice to embed.
pub fn fit_input(text: &str, max_chars: usize, policy: OversizePolicy) -> Result<&str, EmbeddingError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }

    match text.char_indices().nth(max_chars) {
        None => Ok(text),
        Some((cut, _)) => match policy {
            OversizePolicy::Truncate => Ok(&text[..cut]),
            OversizePolicy::Reject => Err(EmbeddingError::InputTooLong {
                len: text.chars().count(),
                max: max_chars,
            }),
        },
    }
}
