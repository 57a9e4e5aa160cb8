//! Maps domain errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domains::submissions::SubmissionError;

/// Wrapper so handlers can `?` service errors straight into responses.
/// All failures surface as `{"error": "<message>"}`; internal failures
/// are logged and return a generic message instead of their details.
pub struct ApiError(pub SubmissionError);

impl From<SubmissionError> for ApiError {
    fn from(error: SubmissionError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SubmissionError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            SubmissionError::Authentication(message) => {
                (StatusCode::UNAUTHORIZED, message.clone())
            }
            SubmissionError::Authorization(message) => (StatusCode::FORBIDDEN, message.clone()),
            SubmissionError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            SubmissionError::Conflict(message) => (StatusCode::CONFLICT, message.clone()),
            SubmissionError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "Identity provider timed out".to_string(),
            ),
            SubmissionError::Store(inner) => {
                error!(error = %inner, "Store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            SubmissionError::Corrupt(inner) => {
                error!(error = %inner, "Malformed stored record");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            SubmissionError::Identity(inner) => {
                error!(error = %inner, "Identity provider failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
