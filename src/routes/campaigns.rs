//! Google Ads variation and LinkedIn campaign routes.

use axum::extract::State;
use axum::response::Json;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::operator::{ApiAccess, Operator};
use super::{ConfirmQuery, parse_action, require_confirmation};
use crate::db::{AdFilter, LinkedInFilter};
use crate::error::ApiError;
use crate::model::{AdFieldsPatch, AdVariation, EntityKind, LinkedInCampaign, LinkedInFieldsPatch};
use crate::services::{ads, linkedin};
use crate::state::AppState;

// =============================================================================
// GOOGLE ADS
// =============================================================================

/// `GET /api/google-ads`
pub async fn list_ads(
    State(state): State<AppState>,
    _access: ApiAccess,
    ApiQuery(filter): ApiQuery<AdFilter>,
) -> Result<Json<Vec<AdVariation>>, ApiError> {
    Ok(Json(ads::list(&state, &filter).await?))
}

/// `GET /api/google-ads/{id}`
pub async fn get_ad(
    State(state): State<AppState>,
    _access: ApiAccess,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<AdVariation>, ApiError> {
    Ok(Json(ads::get(&state, id).await?))
}

/// `PATCH /api/google-ads/{id}`: edit creative and budget while pending.
pub async fn patch_ad(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AdFieldsPatch>,
) -> Result<Json<AdVariation>, ApiError> {
    Ok(Json(ads::update_fields(&state, id, &patch, &actor).await?))
}

/// `DELETE /api/google-ads/{id}?confirm=true`
pub async fn delete_ad(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(confirm): ApiQuery<ConfirmQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_confirmation(confirm, EntityKind::GoogleAdVariation, id)?;
    ads::delete(&state, id, &actor).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/google-ads/{id}/{action}`
pub async fn ad_action(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath((id, action)): ApiPath<(Uuid, String)>,
) -> Result<Json<AdVariation>, ApiError> {
    let action = parse_action(&action)?;
    Ok(Json(ads::transition(&state, id, action, &actor).await?))
}

// =============================================================================
// LINKEDIN CAMPAIGNS
// =============================================================================

/// `GET /api/linkedin-campaigns`
pub async fn list_linkedin(
    State(state): State<AppState>,
    _access: ApiAccess,
    ApiQuery(filter): ApiQuery<LinkedInFilter>,
) -> Result<Json<Vec<LinkedInCampaign>>, ApiError> {
    Ok(Json(linkedin::list(&state, &filter).await?))
}

pub async fn get_linkedin(
    State(state): State<AppState>,
    _access: ApiAccess,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<LinkedInCampaign>, ApiError> {
    Ok(Json(linkedin::get(&state, id).await?))
}

pub async fn patch_linkedin(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<LinkedInFieldsPatch>,
) -> Result<Json<LinkedInCampaign>, ApiError> {
    Ok(Json(linkedin::update_fields(&state, id, &patch, &actor).await?))
}

pub async fn delete_linkedin(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(confirm): ApiQuery<ConfirmQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_confirmation(confirm, EntityKind::LinkedinCampaign, id)?;
    linkedin::delete(&state, id, &actor).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/linkedin-campaigns/{id}/{action}`. Approval is refused with
/// 422 and the list of missing fields when the campaign is incomplete.
pub async fn linkedin_action(
    State(state): State<AppState>,
    Operator(actor): Operator,
    ApiPath((id, action)): ApiPath<(Uuid, String)>,
) -> Result<Json<LinkedInCampaign>, ApiError> {
    let action = parse_action(&action)?;
    Ok(Json(linkedin::transition(&state, id, action, &actor).await?))
}

#[cfg(test)]
#[path = "campaigns_test.rs"]
mod tests;
