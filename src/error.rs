//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid query parameters or generation options.
    #[error("{0}")]
    BadRequest(String),

    /// Request origin is not on the allow list.
    #[error("{0}")]
    Forbidden(String),

    /// Rate limit exceeded.
    #[error("too many requests, try again later")]
    TooManyRequests,

    /// An upstream service (e.g. the release host) failed.
    #[error("{0}")]
    BadGateway(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code (e.g. "bad_request", "too_many_requests").
    pub error: String,
    /// Human-readable detail.
    pub detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match &self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "too_many_requests",
                Some(self.to_string()),
            ),
            ApiError::BadGateway(msg) => {
                tracing::warn!(%msg, "upstream failure");
                (StatusCode::BAD_GATEWAY, "bad_gateway", Some(msg.clone()))
            }
            ApiError::Internal(msg) => {
                // logged server-side only
                tracing::error!(%msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorBody {
            error: error.to_string(),
            detail,
        };

        (status, axum::Json(body)).into_response()
    }
}
