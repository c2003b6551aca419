//! Server-side upload pipeline routes.
//!
//! `POST /api/uploads` takes a multipart form with a `category` text field and
//! a `file` part, runs the pipeline once, and answers with the job. A run that
//! fails at any step answers 502 with the job (failed step, message) attached
//! so the operator can retry it, or discard it with
//! `DELETE /api/uploads/{id}?confirm=true`.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::extract::{ApiMultipart, ApiPath, ApiQuery};
use super::operator::{ApiAccess, Operator};
use super::{ConfirmQuery, require_confirmation};
use crate::error::ApiError;
use crate::model::{EntityKind, FileCategory, UploadStatus};
use crate::services::ServiceError;
use crate::services::upload::{self, NewUpload, UploadJob};
use crate::state::AppState;

type UploadResponse = Result<(StatusCode, Json<UploadJob>), ApiError>;

pub async fn create_upload(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiMultipart(multipart): ApiMultipart,
) -> UploadResponse {
    let upload = read_form(multipart).await?;
    let job = upload::submit(&state, upload, &actor).await?;
    outcome(job, StatusCode::CREATED)
}

pub async fn list_uploads(State(state): State<AppState>, _access: ApiAccess) -> Json<Vec<UploadJob>> {
    Json(upload::list_jobs(&state).await)
}

pub async fn get_upload(
    State(state): State<AppState>,
    _access: ApiAccess,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<UploadJob>, ApiError> {
    upload::get_job(&state, id)
        .await
        .map(Json)
        .ok_or_else(|| ServiceError::not_found(EntityKind::File, id).into())
}

/// `POST /api/uploads/{id}/retry`: re-run a failed job from the first step.
pub async fn retry_upload(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath(id): ApiPath<Uuid>,
) -> UploadResponse {
    let job = upload::retry(&state, id, &actor).await?;
    outcome(job, StatusCode::OK)
}

/// `DELETE /api/uploads/{id}?confirm=true`: drop a job and its retained bytes.
pub async fn discard_upload(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(confirm): ApiQuery<ConfirmQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_confirmation(confirm, EntityKind::File, id)?;
    upload::discard(&state, id, &actor).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

pub(crate) fn outcome(job: UploadJob, ok_status: StatusCode) -> UploadResponse {
    if job.status != UploadStatus::Error {
        return Ok((ok_status, Json(job)));
    }
    let step = job.failed_step.map_or_else(String::new, |s| s.to_string());
    let message = job.error_message.clone().unwrap_or_default();
    let details = serde_json::to_value(&job).unwrap_or_default();
    Err(ApiError::new(StatusCode::BAD_GATEWAY, "E_UPLOAD_FAILED", format!("upload failed at {step}: {message}"))
        .with_details(details))
}

async fn read_form(mut multipart: Multipart) -> Result<NewUpload, ApiError> {
    let mut category = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("category") => {
                let raw = field.text().await.map_err(multipart_error)?;
                let parsed = FileCategory::parse(raw.trim())
                    .ok_or_else(|| ApiError::bad_request(format!("unknown file category '{}'", raw.trim())))?;
                category = Some(parsed);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let category = category.ok_or_else(|| ApiError::bad_request("category field is required"))?;
    let (filename, content_type, bytes) = file.ok_or_else(|| ApiError::bad_request("file field is required"))?;
    Ok(NewUpload { filename, category, content_type, bytes })
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), "E_BAD_MULTIPART", err.body_text())
}

#[cfg(test)]
#[path = "uploads_test.rs"]
mod tests;
