//! Blog post and LinkedIn post review routes.
//!
//! Both content families share handlers; the mounted [`ContentKind`] rides
//! along as a request extension.

use axum::extract::{Extension, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use uuid::Uuid;

use super::extract::{ApiPath, ApiQuery};
use super::operator::{ApiAccess, Operator};
use super::{ConfirmQuery, parse_action, require_confirmation};
use crate::db::ContentFilter;
use crate::error::ApiError;
use crate::model::{ContentItem, ContentKind};
use crate::services::content;
use crate::state::AppState;

/// Mount list, fetch, delete and action routes for one content kind under `base`.
pub fn routes(router: Router<AppState>, base: &str, kind: ContentKind) -> Router<AppState> {
    router
        .route(base, get(list).layer(Extension(kind)))
        .route(
            &format!("{base}/{{id}}"),
            get(fetch).delete(delete).layer(Extension(kind)),
        )
        .route(&format!("{base}/{{id}}/{{action}}"), post(action).layer(Extension(kind)))
}

pub async fn list(
    State(state): State<AppState>,
    _access: ApiAccess,
    Extension(kind): Extension<ContentKind>,
    ApiQuery(filter): ApiQuery<ContentFilter>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    Ok(Json(content::list(&state, kind, &filter).await?))
}

pub async fn fetch(
    State(state): State<AppState>,
    _access: ApiAccess,
    Extension(kind): Extension<ContentKind>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ContentItem>, ApiError> {
    Ok(Json(content::get(&state, kind, id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Operator(actor): Operator,
    Extension(kind): Extension<ContentKind>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(confirm): ApiQuery<ConfirmQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_confirmation(confirm, kind.entity_kind(), id)?;
    content::delete(&state, kind, id, &actor).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST {base}/{id}/{action}`: approve, reject or reset.
pub async fn action(
    State(state): State<AppState>,
    Operator(actor): Operator,
    Extension(kind): Extension<ContentKind>,
    ApiPath((id, action)): ApiPath<(Uuid, String)>,
) -> Result<Json<ContentItem>, ApiError> {
    let action = parse_action(&action)?;
    Ok(Json(content::transition(&state, kind, id, action, &actor).await?))
}
