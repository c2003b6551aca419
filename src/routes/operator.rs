//! Operator identity and API token checks.

use axum::extract::FromRef;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

pub const OPERATOR_HEADER: &str = "x-operator";
const MAX_OPERATOR_LEN: usize = 200;

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Operator performing a mutation. Recorded in audit fields and events.
/// Use as a handler parameter to require an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator(pub String);

/// Read access. Only enforces the bearer token when one is configured.
#[derive(Debug, Clone, Copy)]
pub struct ApiAccess;

impl<S> axum::extract::FromRequestParts<S> for Operator
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        check_token(&parts.headers, app_state.config.operator_token.as_deref())?;
        operator_from_headers(&parts.headers).map(Self)
    }
}

impl<S> axum::extract::FromRequestParts<S> for ApiAccess
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        check_token(&parts.headers, app_state.config.operator_token.as_deref())?;
        Ok(Self)
    }
}

// =============================================================================
// CHECKS
// =============================================================================

pub(crate) fn check_token(headers: &HeaderMap, expected: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default();

    if presented.is_empty() || !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        return Err(ApiError::unauthorized("missing or invalid API token"));
    }
    Ok(())
}

pub(crate) fn operator_from_headers(headers: &HeaderMap) -> Result<String, ApiError> {
    let operator = headers
        .get(OPERATOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if operator.is_empty() {
        return Err(ApiError::unauthorized("X-Operator header is required"));
    }
    if operator.len() > MAX_OPERATOR_LEN {
        return Err(ApiError::bad_request("X-Operator header is too long"));
    }
    Ok(operator.to_owned())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
