//! API error types.
//!
//! Every failure renders as `{"error": <message>}`. Messages are stable and
//! carry no upstream detail; `Internal` detail is logged only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hotscore_models::{ErrorResponse, ImageValidationError};
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image provided")]
    MissingImage,

    #[error(transparent)]
    InvalidImage(#[from] ImageValidationError),

    #[error("Failed to upload image")]
    UploadFailed,

    #[error("Failed to submit prediction")]
    SubmitFailed,

    #[error("Failed to get prediction result")]
    ResultUnavailable,

    #[error("Could not parse prediction result")]
    UnparseableResult,

    #[error("Not found")]
    NotFound,

    #[error("An error occurred during prediction")]
    Internal(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UploadFailed
            | ApiError::SubmitFailed
            | ApiError::ResultUnavailable
            | ApiError::UnparseableResult
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metrics label for a failed prediction.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::MissingImage | ApiError::InvalidImage(_) => "invalid_input",
            ApiError::UploadFailed => "upload_failed",
            ApiError::SubmitFailed => "submit_failed",
            ApiError::ResultUnavailable => "result_failed",
            ApiError::UnparseableResult => "unparseable",
            ApiError::NotFound => "not_found",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(detail = %detail, "Prediction error");
        }

        let status = self.status_code();
        let body = ErrorResponse::new(self.to_string());

        (status, Json(body)).into_response()
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_status() {
        assert_eq!(ApiError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ImageValidationError::TooLarge { size: 6_000_000 }).to_string(),
            "Image too large. Maximum size is 5MB"
        );
        assert_eq!(
            ApiError::internal("connection reset").to_string(),
            "An error occurred during prediction"
        );
        assert_eq!(
            ApiError::UnparseableResult.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
