//! Approval state machine.
//!
//! DESIGN
//! ======
//! Planners are pure: given the current row, an operator action, the actor
//! and the clock, they return the complete status patch to write, or refuse.
//! Nothing here touches the store, so a refused transition can never leave a
//! partial write behind.
//!
//! ```text
//! PENDING ──approve──▶ APPROVED ──▶ ACTIVE ◀──resume── PAUSED
//!    │                     │           │                  ▲
//!    └──reject──▶ REJECTED └──cancel──▶ DELETED/CANCELLED │
//!                                      └──────pause───────┘
//! APPROVED ──pause──▶ PAUSED (before ever going live)
//! any non-initial ──reset──▶ PENDING (approver cleared)
//! ```

use serde::Serialize;
use time::OffsetDateTime;

use crate::error::ErrorCode;
use crate::model::{
    AdStatus, AdStatusPatch, AdVariation, ApprovalStatus, ContentItem, ContentStatus, ContentStatusPatch, EntityKind,
    LinkedInCampaign, LinkedInCampaignStatus, LinkedInStatusPatch,
};

/// Automation status written when a LinkedIn campaign is handed to the platform.
pub const AUTOMATION_QUEUED: &str = "queued";

// =============================================================================
// ACTIONS
// =============================================================================

/// Operator action requested against an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Approve,
    Reject,
    Pause,
    Resume,
    Cancel,
    Archive,
    Reset,
}

impl Action {
    /// Parse a route segment. `decline` and `activate` are accepted aliases.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "approve" => Some(Self::Approve),
            "reject" | "decline" => Some(Self::Reject),
            "pause" => Some(Self::Pause),
            "resume" | "activate" => Some(Self::Resume),
            "cancel" => Some(Self::Cancel),
            "archive" => Some(Self::Archive),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Cancel => "cancel",
            Self::Archive => "archive",
            Self::Reset => "reset",
        }
    }

    /// Past-tense form used as the webhook event suffix.
    #[must_use]
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Pause => "paused",
            Self::Resume => "resumed",
            Self::Cancel => "cancelled",
            Self::Archive => "archived",
            Self::Reset => "reset",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("{kind} does not support '{action}'")]
    Unsupported { kind: EntityKind, action: Action },
    #[error("cannot {action} {kind} in state {from}")]
    NotAllowed { kind: EntityKind, action: Action, from: String },
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl ErrorCode for TransitionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unsupported { .. } => "E_ACTION_UNSUPPORTED",
            Self::NotAllowed { .. } => "E_TRANSITION_NOT_ALLOWED",
            Self::MissingFields(_) => "E_MISSING_FIELDS",
        }
    }
}

fn not_allowed(kind: EntityKind, action: Action, from: String) -> TransitionError {
    TransitionError::NotAllowed { kind, action, from }
}

// =============================================================================
// GOOGLE AD VARIATIONS
// =============================================================================

/// Plan a status transition for a Google ad variation.
///
/// # Errors
///
/// Returns [`TransitionError`] when the action is not valid from the current
/// `(status, approval_status)` pair.
pub fn plan_ad(
    ad: &AdVariation,
    action: Action,
    actor: &str,
    now: OffsetDateTime,
) -> Result<AdStatusPatch, TransitionError> {
    use AdStatus as S;
    use ApprovalStatus as A;

    let kind = EntityKind::GoogleAdVariation;
    let from = || format!("{}/{}", ad.status, ad.approval_status);
    let keep_approver = |status: AdStatus, approval_status: ApprovalStatus| AdStatusPatch {
        status,
        approval_status,
        approved_by: ad.approved_by.clone(),
        approved_at: ad.approved_at,
    };

    match (action, ad.status, ad.approval_status) {
        (Action::Approve, S::Pending, A::Pending) => Ok(AdStatusPatch {
            status: S::Active,
            approval_status: A::Approved,
            approved_by: Some(actor.to_owned()),
            approved_at: Some(now),
        }),
        (Action::Reject, status, A::Pending) if status != S::Deleted => Ok(AdStatusPatch {
            status,
            approval_status: A::Rejected,
            approved_by: Some(actor.to_owned()),
            approved_at: Some(now),
        }),
        (Action::Pause, S::Approved | S::Active, A::Approved) => Ok(keep_approver(S::Paused, A::Approved)),
        (Action::Resume, S::Paused | S::Approved, A::Approved) => Ok(keep_approver(S::Active, A::Approved)),
        (Action::Cancel, S::Approved | S::Active | S::Paused, A::Approved) => {
            Ok(keep_approver(S::Deleted, A::Cancelled))
        }
        (Action::Reset, S::Pending, A::Pending) => Err(not_allowed(kind, action, from())),
        (Action::Reset, _, _) => Ok(AdStatusPatch {
            status: S::Pending,
            approval_status: A::Pending,
            approved_by: None,
            approved_at: None,
        }),
        (Action::Archive, _, _) => Err(TransitionError::Unsupported { kind, action }),
        _ => Err(not_allowed(kind, action, from())),
    }
}

// =============================================================================
// LINKEDIN CAMPAIGNS
// =============================================================================

/// Fields that must be set before a LinkedIn campaign can be approved.
#[must_use]
pub fn linkedin_missing_fields(campaign: &LinkedInCampaign) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if campaign.daily_budget.is_none_or(|budget| budget <= 0.0) {
        missing.push("daily_budget");
    }
    if campaign.start_date.is_none() {
        missing.push("start_date");
    }
    if !campaign.has_targeting() {
        missing.push("targeting");
    }
    missing
}

/// Plan a status transition for a LinkedIn campaign.
///
/// # Errors
///
/// Returns [`TransitionError::MissingFields`] when approving a campaign
/// without budget, schedule or targeting, and [`TransitionError::NotAllowed`]
/// when the action is invalid from the current state.
pub fn plan_linkedin(
    campaign: &LinkedInCampaign,
    action: Action,
    actor: &str,
    now: OffsetDateTime,
) -> Result<LinkedInStatusPatch, TransitionError> {
    use ApprovalStatus as A;
    use LinkedInCampaignStatus as L;

    let kind = EntityKind::LinkedinCampaign;
    let from = || format!("{}/{}", campaign.approval_status, campaign.linkedin_campaign_status);
    let keep = |approval_status: ApprovalStatus, linkedin_campaign_status: LinkedInCampaignStatus| LinkedInStatusPatch {
        approval_status,
        linkedin_campaign_status,
        automation_status: campaign.automation_status.clone(),
        automation_error: campaign.automation_error.clone(),
        approved_by: campaign.approved_by.clone(),
        approved_at: campaign.approved_at,
    };

    match (action, campaign.approval_status, campaign.linkedin_campaign_status) {
        (Action::Approve, A::Pending, L::Draft | L::PendingReview) => {
            let missing = linkedin_missing_fields(campaign);
            if !missing.is_empty() {
                return Err(TransitionError::MissingFields(missing));
            }
            Ok(LinkedInStatusPatch {
                approval_status: A::Approved,
                linkedin_campaign_status: L::PendingReview,
                automation_status: Some(AUTOMATION_QUEUED.to_owned()),
                automation_error: None,
                approved_by: Some(actor.to_owned()),
                approved_at: Some(now),
            })
        }
        (Action::Reject, A::Pending, status) => Ok(LinkedInStatusPatch {
            approved_by: Some(actor.to_owned()),
            approved_at: Some(now),
            ..keep(A::Rejected, status)
        }),
        (Action::Resume, A::Approved, L::Draft | L::PendingReview | L::Paused) => Ok(keep(A::Approved, L::Active)),
        (Action::Pause, A::Approved, L::Draft | L::PendingReview | L::Active) => Ok(keep(A::Approved, L::Paused)),
        (Action::Archive, A::Approved, L::Active | L::Paused) => Ok(keep(A::Approved, L::Archived)),
        (Action::Cancel, A::Approved, status) if !matches!(status, L::Archived | L::Cancelled) => {
            Ok(keep(A::Cancelled, L::Cancelled))
        }
        (Action::Reset, A::Pending, L::Draft) => Err(not_allowed(kind, action, from())),
        (Action::Reset, _, _) => Ok(LinkedInStatusPatch {
            approval_status: A::Pending,
            linkedin_campaign_status: L::Draft,
            automation_status: None,
            automation_error: None,
            approved_by: None,
            approved_at: None,
        }),
        _ => Err(not_allowed(kind, action, from())),
    }
}

// =============================================================================
// CONTENT
// =============================================================================

/// Plan a review transition for a blog post or LinkedIn post.
///
/// # Errors
///
/// Returns [`TransitionError`] for actions content does not support or that
/// are invalid from the current status.
pub fn plan_content(
    item: &ContentItem,
    action: Action,
    actor: &str,
    now: OffsetDateTime,
) -> Result<ContentStatusPatch, TransitionError> {
    let kind = item.kind.entity_kind();
    let reviewed = |status| ContentStatusPatch { status, reviewed_by: Some(actor.to_owned()), reviewed_at: Some(now) };

    match (action, item.status) {
        (Action::Approve, ContentStatus::Unused) => Ok(reviewed(ContentStatus::Approved)),
        (Action::Reject, ContentStatus::Unused) => Ok(reviewed(ContentStatus::Rejected)),
        (Action::Reset, ContentStatus::Approved | ContentStatus::Rejected) => {
            Ok(ContentStatusPatch { status: ContentStatus::Unused, reviewed_by: None, reviewed_at: None })
        }
        (Action::Approve | Action::Reject | Action::Reset, from) => Err(not_allowed(kind, action, from.to_string())),
        (Action::Pause | Action::Resume | Action::Cancel | Action::Archive, _) => {
            Err(TransitionError::Unsupported { kind, action })
        }
    }
}

#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;
