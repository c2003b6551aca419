//! Google Ads ad variation service.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, notify, require_non_negative};
use crate::db::AdFilter;
use crate::model::{AdFieldsPatch, AdVariation, ApprovalStatus, EntityKind};
use crate::state::AppState;
use crate::webhook::Event;
use crate::workflow::{self, Action};

const KIND: EntityKind = EntityKind::GoogleAdVariation;

fn event(ad: &AdVariation, verb: &str, actor: &str) -> Event {
    Event::new(KIND, verb, ad.id, actor)
        .with_data("status", ad.status.as_str())
        .with_data("approval_status", ad.approval_status.as_str())
        .with_opt("campaign_id", ad.campaign_id.clone())
        .with_opt("ad_group_id", ad.ad_group_id.clone())
        .with_opt("final_url", ad.final_url.clone())
        .with_opt("daily_budget", ad.daily_budget)
}

pub async fn list(state: &AppState, filter: &AdFilter) -> Result<Vec<AdVariation>, ServiceError> {
    Ok(state.store.list_ad_variations(filter).await?)
}

pub async fn get(state: &AppState, id: Uuid) -> Result<AdVariation, ServiceError> {
    state
        .store
        .get_ad_variation(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(KIND, id))
}

/// Apply an operator action: one store update, then a webhook event.
///
/// # Errors
///
/// Returns not-found, transition-refused, or store errors. Webhook failures
/// are never returned.
pub async fn transition(state: &AppState, id: Uuid, action: Action, actor: &str) -> Result<AdVariation, ServiceError> {
    let ad = get(state, id).await?;
    let patch = workflow::plan_ad(&ad, action, actor, OffsetDateTime::now_utc())?;
    let updated = state.store.update_ad_status(id, &patch).await?;

    info!(
        %id,
        %action,
        actor,
        status = %updated.status,
        approval_status = %updated.approval_status,
        "ad variation transitioned"
    );

    let event = event(&updated, action.past_tense(), actor).with_data("action", action.as_str());
    notify(state, event);
    Ok(updated)
}

/// Edit creative and budget fields while the ad still awaits approval.
pub async fn update_fields(
    state: &AppState,
    id: Uuid,
    patch: &AdFieldsPatch,
    actor: &str,
) -> Result<AdVariation, ServiceError> {
    require_non_negative("daily_budget", patch.daily_budget)?;
    if patch.headlines.as_ref().is_some_and(Vec::is_empty) {
        return Err(ServiceError::Validation("headlines cannot be empty".into()));
    }

    let ad = get(state, id).await?;
    if ad.approval_status != ApprovalStatus::Pending {
        return Err(ServiceError::Conflict(format!(
            "only pending ad variations can be edited (approval is {})",
            ad.approval_status
        )));
    }

    let updated = state.store.update_ad_fields(id, patch).await?;
    info!(%id, actor, "ad variation edited");
    notify(state, event(&updated, "updated", actor));
    Ok(updated)
}

/// Permanently remove the ad variation.
pub async fn delete(state: &AppState, id: Uuid, actor: &str) -> Result<(), ServiceError> {
    let ad = get(state, id).await?;
    state.store.delete_ad_variation(id).await?;
    info!(%id, actor, "ad variation deleted");
    notify(state, event(&ad, "deleted", actor));
    Ok(())
}

#[cfg(test)]
#[path = "ads_test.rs"]
mod tests;
