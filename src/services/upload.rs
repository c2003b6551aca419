//! Upload pipeline: credential, asset upload, metadata, notification.
//!
//! DESIGN
//! ======
//! Four steps run in order for each file. The first failure stops the run and
//! marks the job `error` with the failing step and message. Nothing retries
//! on its own; `retry` re-runs every step from the credential onward.
//!
//! Jobs live in `AppState::uploads` and keep the file bytes until the run
//! succeeds, so a retry does not need the operator to pick the file again.
//! The registry lock is never held across an await.
//!
//! The registry is bounded on every submit: succeeded jobs expire after
//! `upload_job_ttl_secs`, and the oldest failed jobs are evicted once the
//! bytes they hold exceed `max_retained_upload_bytes`. Operators can also
//! discard a job outright.
//!
//! ERROR HANDLING
//! ==============
//! Once the metadata row exists, a later failure also marks that row `error`.
//! That write is best effort: if it fails too, the job still records the
//! original failure and the secondary error is only logged.

use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::assets::{FileBody, UploadCredential};
use crate::model::{EntityKind, FileCategory, UploadStatus, UploadedFile};
use crate::state::AppState;
use crate::webhook::{Event, WebhookTarget};

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStep {
    Credential,
    AssetUpload,
    Metadata,
    Notify,
}

impl std::fmt::Display for UploadStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Credential => "credential",
            Self::AssetUpload => "asset_upload",
            Self::Metadata => "metadata",
            Self::Notify => "notify",
        };
        f.write_str(name)
    }
}

/// One server-side upload and the outcome of its latest run.
#[derive(Debug, Clone, Serialize)]
pub struct UploadJob {
    pub id: Uuid,
    pub filename: String,
    pub category: FileCategory,
    pub content_type: String,
    pub size_bytes: usize,
    pub status: UploadStatus,
    pub failed_step: Option<UploadStep>,
    pub error_message: Option<String>,
    pub attempts: u32,
    pub file_url: Option<String>,
    pub uploaded_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip)]
    body: Option<FileBody>,
}

/// A file received from the operator.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub filename: String,
    pub category: FileCategory,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

struct StepFailure {
    step: UploadStep,
    message: String,
    metadata_written: bool,
}

impl StepFailure {
    fn at(step: UploadStep, err: impl std::fmt::Display) -> Self {
        Self { step, message: err.to_string(), metadata_written: false }
    }
}

/// Accept PDFs only, within the size limit. Returns the content type to send.
fn validate(upload: &NewUpload, max_bytes: usize) -> Result<String, ServiceError> {
    let filename = upload.filename.trim();
    if filename.is_empty() {
        return Err(ServiceError::Validation("filename is required".into()));
    }
    if upload.bytes.is_empty() {
        return Err(ServiceError::Validation("file is empty".into()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(ServiceError::Validation(format!(
            "file is {} bytes; limit is {max_bytes}",
            upload.bytes.len()
        )));
    }

    let is_pdf_name = filename.to_ascii_lowercase().ends_with(".pdf");
    match upload.content_type.as_deref() {
        Some(PDF_CONTENT_TYPE) => Ok(PDF_CONTENT_TYPE.to_owned()),
        Some("application/octet-stream") | None if is_pdf_name => Ok(PDF_CONTENT_TYPE.to_owned()),
        Some(other) => Err(ServiceError::Validation(format!("only PDF files are accepted, got {other}"))),
        None => Err(ServiceError::Validation("only PDF files are accepted".into())),
    }
}

/// Register a job and run the pipeline once. The returned job carries the
/// outcome; a failed run is not an `Err`.
///
/// # Errors
///
/// Returns a validation error when the file is rejected before any step runs.
pub async fn submit(state: &AppState, upload: NewUpload, actor: &str) -> Result<UploadJob, ServiceError> {
    let content_type = validate(&upload, state.config.max_upload_bytes)?;
    let now = OffsetDateTime::now_utc();
    let id = Uuid::new_v4();
    let filename = upload.filename.trim().to_owned();

    let job = UploadJob {
        id,
        filename: filename.clone(),
        category: upload.category,
        content_type: content_type.clone(),
        size_bytes: upload.bytes.len(),
        status: UploadStatus::Pending,
        failed_step: None,
        error_message: None,
        attempts: 0,
        file_url: None,
        uploaded_by: actor.to_owned(),
        created_at: now,
        updated_at: now,
        body: Some(FileBody { filename, content_type, bytes: upload.bytes }),
    };
    let ttl = time::Duration::seconds(i64::try_from(state.config.upload_job_ttl_secs).unwrap_or(i64::MAX));
    {
        let mut uploads = state.uploads.write().await;
        let evicted = prune_jobs(&mut uploads, now, ttl, state.config.max_retained_upload_bytes);
        if evicted > 0 {
            info!(evicted, "upload jobs evicted");
        }
        uploads.insert(id, job);
    }
    info!(%id, category = %upload.category, actor, "upload submitted");

    run(state, id).await
}

/// Re-run a failed job from the credential step.
///
/// # Errors
///
/// Returns not-found for unknown jobs and a conflict unless the job failed.
pub async fn retry(state: &AppState, id: Uuid, actor: &str) -> Result<UploadJob, ServiceError> {
    {
        let uploads = state.uploads.read().await;
        let job = uploads.get(&id).ok_or_else(|| ServiceError::not_found(EntityKind::File, id))?;
        if job.status != UploadStatus::Error {
            return Err(ServiceError::Conflict(format!("upload {id} is {}; only failed uploads can be retried", job.status)));
        }
    }
    info!(%id, actor, "upload retry requested");
    run(state, id).await
}

/// Drop a job and any bytes it holds. The metadata row, if one was written,
/// is left alone.
///
/// # Errors
///
/// Returns not-found for unknown jobs and a conflict while the job is running.
pub async fn discard(state: &AppState, id: Uuid, actor: &str) -> Result<(), ServiceError> {
    let mut uploads = state.uploads.write().await;
    let job = uploads.get(&id).ok_or_else(|| ServiceError::not_found(EntityKind::File, id))?;
    if job.status == UploadStatus::Uploading {
        return Err(ServiceError::Conflict(format!("upload {id} is running")));
    }
    uploads.remove(&id);
    info!(%id, actor, "upload job discarded");
    Ok(())
}

/// Evict succeeded jobs older than `ttl`, then the oldest failed jobs until
/// the bytes held for retry fit in `retained_limit`. Pending and running jobs
/// are never touched. Returns the number of jobs removed.
fn prune_jobs(
    jobs: &mut HashMap<Uuid, UploadJob>,
    now: OffsetDateTime,
    ttl: time::Duration,
    retained_limit: usize,
) -> usize {
    let before = jobs.len();
    jobs.retain(|_, job| !(job.status == UploadStatus::Success && now - job.updated_at >= ttl));

    let mut failed: Vec<(OffsetDateTime, Uuid, usize)> = jobs
        .values()
        .filter(|job| job.status == UploadStatus::Error)
        .filter_map(|job| job.body.as_ref().map(|body| (job.updated_at, job.id, body.bytes.len())))
        .collect();
    failed.sort_unstable();

    let mut retained: usize = failed.iter().map(|(_, _, len)| len).sum();
    for (_, id, len) in failed {
        if retained <= retained_limit {
            break;
        }
        jobs.remove(&id);
        retained -= len;
    }
    before - jobs.len()
}

pub async fn list_jobs(state: &AppState) -> Vec<UploadJob> {
    let mut jobs: Vec<UploadJob> = state.uploads.read().await.values().cloned().collect();
    jobs.sort_by_key(|job| std::cmp::Reverse(job.created_at));
    jobs
}

pub async fn get_job(state: &AppState, id: Uuid) -> Option<UploadJob> {
    state.uploads.read().await.get(&id).cloned()
}

async fn run(state: &AppState, id: Uuid) -> Result<UploadJob, ServiceError> {
    // Claim the job. A job already uploading is left alone.
    let job = {
        let mut uploads = state.uploads.write().await;
        let job = uploads.get_mut(&id).ok_or_else(|| ServiceError::not_found(EntityKind::File, id))?;
        if job.status == UploadStatus::Uploading {
            return Err(ServiceError::Conflict(format!("upload {id} is already running")));
        }
        job.status = UploadStatus::Uploading;
        job.failed_step = None;
        job.error_message = None;
        job.attempts += 1;
        job.updated_at = OffsetDateTime::now_utc();
        job.clone()
    };

    let outcome = run_steps(state, &job).await;
    if let Err(failure) = &outcome
        && failure.metadata_written
    {
        mark_record_failed(state, id, failure).await;
    }

    let mut uploads = state.uploads.write().await;
    let Some(stored) = uploads.get_mut(&id) else {
        return Err(ServiceError::not_found(EntityKind::File, id));
    };
    stored.updated_at = OffsetDateTime::now_utc();
    match outcome {
        Ok(file_url) => {
            stored.status = UploadStatus::Success;
            stored.file_url = Some(file_url);
            stored.body = None;
            info!(%id, attempts = stored.attempts, "upload complete");
        }
        Err(failure) => {
            stored.status = UploadStatus::Error;
            stored.failed_step = Some(failure.step);
            stored.error_message = Some(failure.message);
        }
    }
    Ok(stored.clone())
}

async fn mark_record_failed(state: &AppState, id: Uuid, failure: &StepFailure) {
    let message = format!("{}: {}", failure.step, failure.message);
    if let Err(e) = state.store.set_file_status(id, UploadStatus::Error, Some(&message)).await {
        warn!(%id, error = %e, "could not mark file record as failed");
    }
}

async fn run_steps(state: &AppState, job: &UploadJob) -> Result<String, StepFailure> {
    let Some(body) = job.body.as_ref() else {
        return Err(StepFailure::at(UploadStep::Credential, "file bytes are no longer available"));
    };

    // STEP 1: credential
    let credential = issue_credential(state, job.id).await.map_err(|e| {
        warn!(id = %job.id, step = %UploadStep::Credential, error = %e, "upload step failed");
        StepFailure::at(UploadStep::Credential, e)
    })?;

    // STEP 2: asset upload
    let Some(assets) = state.assets.as_ref() else {
        return Err(StepFailure::at(UploadStep::AssetUpload, ServiceError::NotConfigured("asset store")));
    };
    let asset = assets.upload(&credential, body).await.map_err(|e| {
        warn!(id = %job.id, step = %UploadStep::AssetUpload, error = %e, "upload step failed");
        StepFailure::at(UploadStep::AssetUpload, e)
    })?;

    // STEP 3: metadata
    let now = OffsetDateTime::now_utc();
    let record = UploadedFile {
        id: job.id,
        filename: job.filename.clone(),
        category: job.category,
        file_url: Some(asset.secure_url.clone()),
        public_id: Some(asset.public_id.clone()),
        content_type: Some(job.content_type.clone()),
        size_bytes: i64::try_from(job.size_bytes).unwrap_or(i64::MAX),
        upload_status: UploadStatus::Success,
        error_message: None,
        uploaded_by: Some(job.uploaded_by.clone()),
        created_at: job.created_at,
        updated_at: now,
    };
    let saved = state.store.upsert_file(&record).await.map_err(|e| {
        warn!(id = %job.id, step = %UploadStep::Metadata, error = %e, "upload step failed");
        StepFailure::at(UploadStep::Metadata, e)
    })?;

    // STEP 4: notify
    let target = WebhookTarget::for_category(job.category);
    let event = file_event(&saved, "uploaded", &job.uploaded_by);
    if let Err(e) = state.notifier.deliver(target, &event).await {
        warn!(id = %job.id, step = %UploadStep::Notify, %target, error = %e, "upload step failed");
        return Err(StepFailure { step: UploadStep::Notify, message: e.to_string(), metadata_written: true });
    }

    Ok(asset.secure_url)
}

async fn issue_credential(state: &AppState, id: Uuid) -> Result<UploadCredential, ServiceError> {
    let credentials = state
        .credentials
        .as_ref()
        .ok_or(ServiceError::NotConfigured("asset store"))?;
    Ok(credentials.issue(&id.simple().to_string()).await?)
}

/// Event payload for file lifecycle webhooks.
pub(crate) fn file_event(file: &UploadedFile, verb: &str, actor: &str) -> Event {
    Event::new(EntityKind::File, verb, file.id, actor)
        .with_data("filename", file.filename.clone())
        .with_data("category", file.category.as_str())
        .with_data("size_bytes", file.size_bytes)
        .with_opt("file_url", file.file_url.clone())
        .with_opt("public_id", file.public_id.clone())
        .with_opt("content_type", file.content_type.clone())
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
