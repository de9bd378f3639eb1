//! HTTP error mapping.
//!
//! Every user-visible failure resolves to a friendly message under a stable
//! status code; raw provider errors and stack traces never leave the
//! process (they are logged instead).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use shopchat_chat::ChatError;
use shopchat_pipeline::PipelineError;

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API-surface errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request; nothing external was called.
    #[error("{0}")]
    BadRequest(String),

    /// The shop has this surface disabled.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Server-side failure; the message is safe for end users.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Validation(msg) => Self::BadRequest(msg),
            ChatError::ChatDisabled => {
                Self::Forbidden("Chat is not enabled for this shop.".to_string())
            }
            ChatError::ProviderNotConfigured => {
                error!("chat turn failed: {err}");
                Self::Internal(
                    "The assistant is not available right now. Please try again later."
                        .to_string(),
                )
            }
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidTopic(topic) => {
                Self::BadRequest(format!("invalid webhook topic: {topic}"))
            }
            PipelineError::MalformedPayload(msg) => {
                Self::BadRequest(format!("malformed webhook payload: {msg}"))
            }
            PipelineError::ProductNotFound(id) => Self::NotFound(format!("product not found: {id}")),
            PipelineError::Catalog(_) | PipelineError::Embedding(_) => {
                error!("webhook processing failed: {err}");
                Self::Internal("Event processing failed; it will be retried.".to_string())
            }
        }
    }
}
