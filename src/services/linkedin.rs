//! LinkedIn Ads campaign service.
//!
//! Approval hands the campaign to the automation platform, which creates it on
//! LinkedIn and writes back `linkedin_campaign_id` and `automation_status`.
//! That is why approval is guarded: a campaign without budget, schedule or
//! targeting would be rejected by the ad platform after the fact.

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, notify, require_non_negative};
use crate::db::LinkedInFilter;
use crate::model::{ApprovalStatus, EntityKind, LinkedInCampaign, LinkedInFieldsPatch};
use crate::state::AppState;
use crate::webhook::Event;
use crate::workflow::{self, Action, TransitionError};

const KIND: EntityKind = EntityKind::LinkedinCampaign;

fn event(campaign: &LinkedInCampaign, verb: &str, actor: &str) -> Event {
    Event::new(KIND, verb, campaign.id, actor)
        .with_data("campaign_name", campaign.campaign_name.clone())
        .with_data("approval_status", campaign.approval_status.as_str())
        .with_data("linkedin_campaign_status", campaign.linkedin_campaign_status.as_str())
        .with_data("currency", campaign.currency.clone())
        .with_opt("linkedin_campaign_id", campaign.linkedin_campaign_id.clone())
        .with_opt("automation_status", campaign.automation_status.clone())
        .with_opt("daily_budget", campaign.daily_budget)
        .with_opt("start_date", campaign.start_date.map(|d| d.to_string()))
        .with_opt("end_date", campaign.end_date.map(|d| d.to_string()))
}

pub async fn list(state: &AppState, filter: &LinkedInFilter) -> Result<Vec<LinkedInCampaign>, ServiceError> {
    Ok(state.store.list_linkedin_campaigns(filter).await?)
}

pub async fn get(state: &AppState, id: Uuid) -> Result<LinkedInCampaign, ServiceError> {
    state
        .store
        .get_linkedin_campaign(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(KIND, id))
}

/// Apply an operator action. A refused approval writes nothing.
pub async fn transition(
    state: &AppState,
    id: Uuid,
    action: Action,
    actor: &str,
) -> Result<LinkedInCampaign, ServiceError> {
    let campaign = get(state, id).await?;
    let patch = match workflow::plan_linkedin(&campaign, action, actor, OffsetDateTime::now_utc()) {
        Ok(patch) => patch,
        Err(TransitionError::MissingFields(missing)) => {
            warn!(%id, actor, missing = ?missing, "linkedin approval refused");
            return Err(TransitionError::MissingFields(missing).into());
        }
        Err(e) => return Err(e.into()),
    };
    let updated = state.store.update_linkedin_status(id, &patch).await?;

    info!(
        %id,
        %action,
        actor,
        approval_status = %updated.approval_status,
        linkedin_campaign_status = %updated.linkedin_campaign_status,
        "linkedin campaign transitioned"
    );

    let event = event(&updated, action.past_tense(), actor).with_data("action", action.as_str());
    notify(state, event);
    Ok(updated)
}

fn validate_patch(current: &LinkedInCampaign, patch: &LinkedInFieldsPatch) -> Result<(), ServiceError> {
    require_non_negative("daily_budget", patch.daily_budget)?;
    require_non_negative("total_budget", patch.total_budget)?;

    let start = patch.start_date.or(current.start_date);
    let end = patch.end_date.or(current.end_date);
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        return Err(ServiceError::Validation(format!("end_date {end} is before start_date {start}")));
    }

    let daily = patch.daily_budget.or(current.daily_budget);
    let total = patch.total_budget.or(current.total_budget);
    if let (Some(daily), Some(total)) = (daily, total)
        && daily > total
    {
        return Err(ServiceError::Validation("daily_budget exceeds total_budget".into()));
    }
    Ok(())
}

/// Fill in or correct approval-relevant fields before approval.
pub async fn update_fields(
    state: &AppState,
    id: Uuid,
    patch: &LinkedInFieldsPatch,
    actor: &str,
) -> Result<LinkedInCampaign, ServiceError> {
    let campaign = get(state, id).await?;
    if campaign.approval_status != ApprovalStatus::Pending {
        return Err(ServiceError::Conflict(format!(
            "only pending campaigns can be edited (approval is {})",
            campaign.approval_status
        )));
    }
    validate_patch(&campaign, patch)?;

    let updated = state.store.update_linkedin_fields(id, patch).await?;
    let missing = workflow::linkedin_missing_fields(&updated);
    info!(%id, actor, still_missing = ?missing, "linkedin campaign edited");
    notify(state, event(&updated, "updated", actor));
    Ok(updated)
}

pub async fn delete(state: &AppState, id: Uuid, actor: &str) -> Result<(), ServiceError> {
    let campaign = get(state, id).await?;
    state.store.delete_linkedin_campaign(id).await?;
    info!(%id, actor, "linkedin campaign deleted");
    notify(state, event(&campaign, "deleted", actor));
    Ok(())
}

#[cfg(test)]
#[path = "linkedin_test.rs"]
mod tests;
