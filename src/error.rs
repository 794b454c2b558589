use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("image could not be read: {0}")]
    UnreadableImage(String),

    #[error("image is too small for analysis: {width}x{height}")]
    ImageTooSmall { width: u32, height: u32 },

    #[error("image analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UnreadableImage(_) | AppError::ImageTooSmall { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            // Classifier details stay in the logs.
            AppError::AnalysisFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "image analysis failed".to_string(),
            ),
            AppError::Storage(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("storage error: {err}"),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
