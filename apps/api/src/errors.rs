use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::EngineError;
use crate::ingestion::IngestError;

/// Fixed client-facing message for failed uploads.
pub const RESUME_PROCESSING_FAILED: &str = "Error processing resume";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Bodies follow the `{"detail": ...}` shape the frontend expects.
#[derive(Debug, Error)]
pub enum AppError {
    /// Upload failure. The cause is logged, never sent to the client.
    #[error("Error processing resume")]
    ResumeProcessing(#[source] IngestError),

    /// Analysis failure. The cause's message is returned as the detail.
    #[error("{0}")]
    Analysis(#[from] EngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::ResumeProcessing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RESUME_PROCESSING_FAILED.to_string(),
            ),
            AppError::Analysis(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
