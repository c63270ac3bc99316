use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::{ExtractionError, UNSUPPORTED_TYPE_MESSAGE};
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported file type")]
    UnsupportedType,

    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Model unavailable")]
    ModelUnavailable,

    #[error("Model call failed: {0}")]
    ModelCallFailure(#[from] LlmError),
}

impl AppError {
    /// Stable machine-readable kind sent alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingInput(_) => "MISSING_INPUT",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::UnsupportedType => "UNSUPPORTED_TYPE",
            AppError::ParseFailure(_) => "PARSE_FAILURE",
            AppError::ModelUnavailable => "MODEL_UNAVAILABLE",
            AppError::ModelCallFailure(_) => "MODEL_CALL_FAILURE",
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedType => AppError::UnsupportedType,
            ExtractionError::ParseFailure(msg) => AppError::ParseFailure(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            AppError::UnsupportedType => {
                (StatusCode::BAD_REQUEST, UNSUPPORTED_TYPE_MESSAGE.to_string())
            }
            AppError::ParseFailure(msg) => {
                tracing::warn!("Document parse failure: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    format!("Could not read the uploaded file: {msg}"),
                )
            }
            AppError::ModelUnavailable => {
                tracing::error!("Analysis requested but no model is configured (GEMINI_API_KEY unset)");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The AI model is not configured on this server.".to_string(),
                )
            }
            AppError::ModelCallFailure(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An error occurred with the AI model: {e}"),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
