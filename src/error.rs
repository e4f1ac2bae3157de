use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// ApiError
///
/// The single error type returned by handlers, extractors and guards.
/// Every variant maps to exactly one HTTP status, and every failure produces
/// a structured `{"detail": <message>}` JSON body. Failures are terminal for
/// the request: no retries, no partial success.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Credential missing, malformed, expired, or resolving to no user.
    #[error("{0}")]
    Unauthorized(String),

    /// Resolved identity lacks a role in the operation's allow-list.
    #[error("{0}")]
    Forbidden(String),

    /// Quota exceeded for this identity + route within the current window.
    #[error("{0}")]
    TooManyRequests(String),

    /// Malformed input: non-positive id, payload failing schema validation.
    #[error("{0}")]
    Validation(String),

    /// Resource absent, not owned by the caller, or (list endpoint) empty.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email on create.
    #[error("{0}")]
    Conflict(String),

    /// A storage error that reached a handler. Logged server-side; the
    /// client only sees a sanitized message.
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
