//! File endpoints for browser-direct uploads.
//!
//! The browser asks for a signed credential, posts the file straight to the
//! asset store, then reports the result through `save_file`. Server-side
//! uploads go through [`super::upload`] instead.

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use super::upload::file_event;
use crate::assets::UploadCredential;
use crate::db::FileFilter;
use crate::model::{EntityKind, FileCategory, UploadStatus, UploadedFile};
use crate::state::AppState;
use crate::webhook::WebhookTarget;

/// Metadata the browser reports after a direct upload.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveFileRequest {
    pub filename: String,
    pub category: FileCategory,
    pub file_url: String,
    pub public_id: Option<String>,
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: i64,
}

/// Issue a signed credential for a new object id.
pub async fn generate_upload_url(state: &AppState, actor: &str) -> Result<UploadCredential, ServiceError> {
    let credentials = state
        .credentials
        .as_ref()
        .ok_or(ServiceError::NotConfigured("asset store"))?;
    let public_id = Uuid::new_v4().simple().to_string();
    let credential = credentials.issue(&public_id).await?;
    info!(%public_id, actor, expires_at = %credential.expires_at, "upload credential issued");
    Ok(credential)
}

fn validate(request: &SaveFileRequest) -> Result<(), ServiceError> {
    if request.filename.trim().is_empty() {
        return Err(ServiceError::Validation("filename is required".into()));
    }
    if !(request.file_url.starts_with("https://") || request.file_url.starts_with("http://")) {
        return Err(ServiceError::Validation("file_url must be an http(s) URL".into()));
    }
    if request.size_bytes < 0 {
        return Err(ServiceError::Validation("size_bytes must be non-negative".into()));
    }
    Ok(())
}

/// Persist metadata for a completed direct upload and notify its webhook.
pub async fn save_file(state: &AppState, request: SaveFileRequest, actor: &str) -> Result<UploadedFile, ServiceError> {
    validate(&request)?;

    let now = OffsetDateTime::now_utc();
    let file = UploadedFile {
        id: Uuid::new_v4(),
        filename: request.filename.trim().to_owned(),
        category: request.category,
        file_url: Some(request.file_url),
        public_id: request.public_id,
        content_type: request.content_type,
        size_bytes: request.size_bytes,
        upload_status: UploadStatus::Success,
        error_message: None,
        uploaded_by: Some(actor.to_owned()),
        created_at: now,
        updated_at: now,
    };
    let saved = state.store.upsert_file(&file).await?;
    info!(id = %saved.id, category = %saved.category, actor, "file metadata saved");

    let target = WebhookTarget::for_category(saved.category);
    state.notifier.enqueue(target, file_event(&saved, "uploaded", actor));
    Ok(saved)
}

pub async fn list(state: &AppState, filter: &FileFilter) -> Result<Vec<UploadedFile>, ServiceError> {
    Ok(state.store.list_files(filter).await?)
}

/// Remove the metadata row. The asset itself stays in the asset store.
pub async fn delete(state: &AppState, id: Uuid, actor: &str) -> Result<(), ServiceError> {
    let file = state
        .store
        .get_file(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::File, id))?;
    state.store.delete_file(id).await?;
    state.uploads.write().await.remove(&id);
    info!(%id, actor, "file deleted");

    let target = WebhookTarget::for_category(file.category);
    state.notifier.enqueue(target, file_event(&file, "deleted", actor));
    Ok(())
}
