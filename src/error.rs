//! Error codes and the JSON error envelope returned by every route.
//!
//! DESIGN
//! ======
//! Each layer owns a `thiserror` enum. Implementing [`ErrorCode`] gives it a
//! grepable code and a retryable flag; [`ApiError`] turns any of them into
//! `{ "error": { code, message, retryable, details? } }` with an HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// Grepable error code and retryable flag for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Error response body shared by all routes.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiError {
    /// Build from a typed error with an explicit HTTP status.
    pub fn from_code(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                code: err.error_code(),
                message: err.to_string(),
                retryable: err.retryable(),
                details: None,
            },
        }
    }

    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, body: ApiErrorBody { code, message: message.into(), retryable: false, details: None } }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.body.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "E_BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "E_UNAUTHORIZED", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.body }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("upstream timed out")]
    struct Timeout;

    impl ErrorCode for Timeout {
        fn error_code(&self) -> &'static str {
            "E_TIMEOUT"
        }

        fn retryable(&self) -> bool {
            true
        }
    }

    #[test]
    fn from_code_copies_code_message_and_retryable() {
        let err = ApiError::from_code(StatusCode::BAD_GATEWAY, &Timeout);
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.body.code, "E_TIMEOUT");
        assert_eq!(err.body.message, "upstream timed out");
        assert!(err.body.retryable);
        assert!(err.body.details.is_none());
    }

    #[test]
    fn body_serializes_details_only_when_present() {
        let plain = serde_json::to_value(&ApiError::bad_request("nope").body).unwrap();
        assert!(plain.get("details").is_none());

        let detailed = ApiError::bad_request("nope").with_details(serde_json::json!({"fields": ["a"]}));
        let value = serde_json::to_value(&detailed.body).unwrap();
        assert_eq!(value["details"]["fields"][0], "a");
        assert_eq!(value["code"], "E_BAD_REQUEST");
    }

    #[test]
    fn into_response_uses_status() {
        let response = ApiError::unauthorized("missing operator").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
