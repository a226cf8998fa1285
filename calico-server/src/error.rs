//! Error types for calico-server
//!
//! Every handler error renders as the shared JSON envelope:
//! 400/404 carry `{success: false, message}`, 500 additionally carries
//! `error` with the underlying detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use calico_common::api::ApiResponse;
use std::fmt::Display;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request input (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Storage or upstream failure (500)
    #[error("{message}: {error}")]
    Internal { message: String, error: String },
}

impl ApiError {
    /// Wrap an unexpected failure with an operation-specific summary
    ///
    /// The detail is logged here so handlers only need `map_err`.
    pub fn internal(message: impl Into<String>, error: impl Display) -> Self {
        let message = message.into();
        let error = error.to_string();
        tracing::error!(error = %error, "{}", message);
        ApiError::Internal { message, error }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(message) | ApiError::NotFound(message) => {
                ApiResponse::failure(message, None)
            }
            ApiError::Internal { message, error } => ApiResponse::failure(message, Some(error)),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let (status, body) = render(ApiError::NotFound("Song not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Song not found");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_internal_envelope_carries_detail() {
        let (status, body) = render(ApiError::internal("Failed to load songs", "disk full")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to load songs");
        assert_eq!(body["error"], "disk full");
    }
}
