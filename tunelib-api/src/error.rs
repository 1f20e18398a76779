//! Error types for tunelib-api
//!
//! Every handler returns `ApiResult`. The response body is always
//! `{"success": false, "error": "<message>"}` with a status chosen from the
//! error kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::ai_client::AiError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing or out-of-range input (400)
    #[error("{0}")]
    Validation(String),

    /// Referenced entity absent (404)
    #[error("{0} not found")]
    NotFound(String),

    /// Duplicate membership (409)
    #[error("{0}")]
    Conflict(String),

    /// Failure reported by, or talking to, the AI service
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Anything unclassified (500); the detail is logged, never returned
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tunelib_common::Error> for ApiError {
    fn from(err: tunelib_common::Error) -> Self {
        use tunelib_common::Error;

        match err {
            Error::Validation(msg) => ApiError::Validation(msg),
            Error::NotFound(what) => ApiError::NotFound(what),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            other @ (Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_)) => {
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::Upstream {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                "Internal server error".to_string()
            }
            ApiError::Upstream { message, .. } => {
                warn!("AI proxy error ({}): {}", status, message);
                message.clone()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_common_errors_map_to_statuses() {
        let cases = [
            (tunelib_common::Error::validation("bad"), StatusCode::BAD_REQUEST),
            (tunelib_common::Error::not_found("Song"), StatusCode::NOT_FOUND),
            (
                tunelib_common::Error::Conflict("dup".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                tunelib_common::Error::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                tunelib_common::Error::Config("cfg".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = ApiError::NotFound("Playlist".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Playlist not found");
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let response = ApiError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_upstream_keeps_status_and_message() {
        let response = ApiError::Upstream {
            status: StatusCode::GATEWAY_TIMEOUT,
            message: "slow".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(response).await["error"], "slow");
    }
}
