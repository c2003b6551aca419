//! Direct-upload credential and file metadata routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::operator::{ApiAccess, Operator};
use super::{ConfirmQuery, require_confirmation};
use crate::assets::UploadCredential;
use crate::db::FileFilter;
use crate::error::ApiError;
use crate::model::{EntityKind, UploadedFile};
use crate::services::files::{self, SaveFileRequest};
use crate::state::AppState;

/// `POST /api/generate-upload-url`: signed credential for a browser upload.
pub async fn generate_upload_url(
    State(state): State<AppState>,
    Operator(actor): Operator,
) -> Result<Json<UploadCredential>, ApiError> {
    Ok(Json(files::generate_upload_url(&state, &actor).await?))
}

/// `POST /api/save-file`: record a completed browser upload.
pub async fn save_file(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiJson(body): ApiJson<SaveFileRequest>,
) -> Result<(StatusCode, Json<UploadedFile>), ApiError> {
    let saved = files::save_file(&state, body, &actor).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn list_files(
    State(state): State<AppState>,
    _access: ApiAccess,
    ApiQuery(filter): ApiQuery<FileFilter>,
) -> Result<Json<Vec<UploadedFile>>, ApiError> {
    Ok(Json(files::list(&state, &filter).await?))
}

/// `DELETE /api/files/{id}?confirm=true`
pub async fn delete_file(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(confirm): ApiQuery<ConfirmQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_confirmation(confirm, EntityKind::File, id)?;
    files::delete(&state, id, &actor).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileCategory;
    use crate::state::test_helpers::test_app;

    fn ops() -> Operator {
        Operator("ops@example.test".into())
    }

    fn body() -> SaveFileRequest {
        SaveFileRequest {
            filename: "contacts.pdf".into(),
            category: FileCategory::ContactEnrichmentPdf,
            file_url: "https://cdn.test/uploads/contacts.pdf".into(),
            public_id: Some("uploads/contacts".into()),
            content_type: Some("application/pdf".into()),
            size_bytes: 10,
        }
    }

    #[tokio::test]
    async fn save_file_returns_created() {
        let app = test_app();
        let (status, Json(file)) = save_file(State(app.state.clone()), ops(), ApiJson(body())).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(file.filename, "contacts.pdf");
    }

    #[tokio::test]
    async fn generate_upload_url_unconfigured_is_service_unavailable() {
        let mut app = test_app();
        app.state.credentials = None;
        let err = generate_upload_url(State(app.state.clone()), ops()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.body.code, "E_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn delete_file_needs_confirm_then_removes() {
        let app = test_app();
        let (_, Json(file)) = save_file(State(app.state.clone()), ops(), ApiJson(body())).await.unwrap();

        let err = delete_file(State(app.state.clone()), ops(), ApiPath(file.id), ApiQuery(ConfirmQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::PRECONDITION_REQUIRED);
        assert_eq!(app.store.file_count(), 1);

        delete_file(State(app.state.clone()), ops(), ApiPath(file.id), ApiQuery(ConfirmQuery { confirm: true }))
            .await
            .unwrap();
        let Json(files) = list_files(State(app.state.clone()), ApiAccess, ApiQuery(FileFilter::default()))
            .await
            .unwrap();
        assert!(files.is_empty());
    }
}
