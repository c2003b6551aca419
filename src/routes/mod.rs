//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds every JSON endpoint under one Axum router, maps service
//! errors onto HTTP statuses, and owns the two request-level guards shared by
//! all entity routes: action parsing and the delete confirmation gate.

pub mod campaigns;
pub mod content;
pub mod extract;
pub mod files;
pub mod health;
pub mod operator;
pub mod uploads;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::{ApiError, ErrorCode};
use crate::model::{ContentKind, EntityKind};
use crate::services::ServiceError;
use crate::state::AppState;
use crate::workflow::{Action, TransitionError};
use crate::{assets::UploadError, db::StoreError};

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let upload_limit = state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);

    let router = Router::new()
        .route("/api/google-ads", get(campaigns::list_ads))
        .route(
            "/api/google-ads/{id}",
            get(campaigns::get_ad)
                .patch(campaigns::patch_ad)
                .delete(campaigns::delete_ad),
        )
        .route("/api/google-ads/{id}/{action}", post(campaigns::ad_action))
        .route("/api/linkedin-campaigns", get(campaigns::list_linkedin))
        .route(
            "/api/linkedin-campaigns/{id}",
            get(campaigns::get_linkedin)
                .patch(campaigns::patch_linkedin)
                .delete(campaigns::delete_linkedin),
        )
        .route("/api/linkedin-campaigns/{id}/{action}", post(campaigns::linkedin_action));

    let router = content::routes(router, "/api/blog-posts", ContentKind::BlogPost);
    let router = content::routes(router, "/api/linkedin-posts", ContentKind::LinkedinPost);

    router
        .route("/api/generate-upload-url", post(files::generate_upload_url))
        .route("/api/save-file", post(files::save_file))
        .route("/api/files", get(files::list_files))
        .route("/api/files/{id}", axum::routing::delete(files::delete_file))
        .route(
            "/api/uploads",
            get(uploads::list_uploads)
                .post(uploads::create_upload)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/uploads/{id}", get(uploads::get_upload).delete(uploads::discard_upload))
        .route("/api/uploads/{id}/retry", post(uploads::retry_upload))
        .route("/api/dashboard", get(health::dashboard))
        .route("/api/system-health", get(health::system_health))
        .route("/api/status-badges", get(health::status_badges))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Database(_) | StoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn transition_status(err: &TransitionError) -> StatusCode {
    match err {
        TransitionError::Unsupported { .. } => StatusCode::BAD_REQUEST,
        TransitionError::NotAllowed { .. } => StatusCode::CONFLICT,
        TransitionError::MissingFields(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub(crate) fn service_error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Store(e) => store_status(e),
        ServiceError::Transition(e) => transition_status(e),
        ServiceError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Upload(UploadError::Signing(_) | UploadError::HttpClientBuild(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ServiceError::Upload(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = service_error_status(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, code = err.error_code(), "request failed");
        }
        let api = ApiError::from_code(status, &err);
        match &err {
            ServiceError::Transition(TransitionError::MissingFields(fields)) => {
                api.with_details(serde_json::json!({ "missing_fields": fields }))
            }
            _ => api,
        }
    }
}

// =============================================================================
// SHARED GUARDS
// =============================================================================

pub(crate) fn parse_action(raw: &str) -> Result<Action, ApiError> {
    Action::parse(raw).ok_or_else(|| {
        ApiError::new(StatusCode::BAD_REQUEST, "E_UNKNOWN_ACTION", format!("unknown action '{raw}'"))
    })
}

/// `?confirm=true` on destructive requests.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Refuse a delete that was not explicitly confirmed. Nothing is read or
/// written before this check.
pub(crate) fn require_confirmation(query: ConfirmQuery, kind: EntityKind, id: Uuid) -> Result<(), ApiError> {
    if query.confirm {
        return Ok(());
    }
    Err(ApiError::new(
        StatusCode::PRECONDITION_REQUIRED,
        "E_CONFIRMATION_REQUIRED",
        format!(
            "Permanently delete {} {id}? This cannot be undone. Repeat the request with ?confirm=true.",
            kind.noun()
        ),
    ))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
