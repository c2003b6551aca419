use super::*;
use crate::model::ContentKind;
use crate::state::test_helpers;

fn now() -> OffsetDateTime {
    time::macros::datetime!(2025-03-04 10:00 UTC)
}

fn ad_in(status: AdStatus, approval_status: ApprovalStatus) -> AdVariation {
    AdVariation {
        status,
        approval_status,
        approved_by: Some("earlier@ops.test".into()),
        approved_at: Some(time::macros::datetime!(2025-03-01 09:00 UTC)),
        ..test_helpers::ad_variation()
    }
}

fn campaign_in(approval_status: ApprovalStatus, status: LinkedInCampaignStatus) -> LinkedInCampaign {
    LinkedInCampaign { approval_status, linkedin_campaign_status: status, ..test_helpers::linkedin_campaign() }
}

// =========================================================================
// Action parsing
// =========================================================================

#[test]
fn action_parse_accepts_aliases() {
    assert_eq!(Action::parse("decline"), Some(Action::Reject));
    assert_eq!(Action::parse("activate"), Some(Action::Resume));
    assert_eq!(Action::parse("approve"), Some(Action::Approve));
    assert_eq!(Action::parse("APPROVE"), None);
    assert_eq!(Action::parse("delete"), None);
}

#[test]
fn past_tense_names_event_suffix() {
    assert_eq!(Action::Approve.past_tense(), "approved");
    assert_eq!(Action::Cancel.past_tense(), "cancelled");
    assert_eq!(Action::Reset.past_tense(), "reset");
}

// =========================================================================
// Google ad variations
// =========================================================================

#[test]
fn approving_pending_ad_activates_and_records_approver() {
    let ad = test_helpers::ad_variation();
    let patch = plan_ad(&ad, Action::Approve, "ops@example.test", now()).unwrap();
    assert_eq!(patch.status, AdStatus::Active);
    assert_eq!(patch.approval_status, ApprovalStatus::Approved);
    assert_eq!(patch.approved_by.as_deref(), Some("ops@example.test"));
    assert_eq!(patch.approved_at, Some(now()));
}

#[test]
fn pausing_active_ad_keeps_approval() {
    let ad = ad_in(AdStatus::Active, ApprovalStatus::Approved);
    let patch = plan_ad(&ad, Action::Pause, "ops", now()).unwrap();
    assert_eq!(patch.status, AdStatus::Paused);
    assert_eq!(patch.approval_status, ApprovalStatus::Approved);
    assert_eq!(patch.approved_by, ad.approved_by);
    assert_eq!(patch.approved_at, ad.approved_at);
}

#[test]
fn resume_returns_paused_ad_to_active() {
    let ad = ad_in(AdStatus::Paused, ApprovalStatus::Approved);
    let patch = plan_ad(&ad, Action::Resume, "ops", now()).unwrap();
    assert_eq!(patch.status, AdStatus::Active);
}

#[test]
fn cancel_marks_ad_deleted_and_cancelled() {
    let ad = ad_in(AdStatus::Active, ApprovalStatus::Approved);
    let patch = plan_ad(&ad, Action::Cancel, "ops", now()).unwrap();
    assert_eq!(patch.status, AdStatus::Deleted);
    assert_eq!(patch.approval_status, ApprovalStatus::Cancelled);
}

#[test]
fn reject_only_from_pending_approval() {
    let pending = test_helpers::ad_variation();
    let patch = plan_ad(&pending, Action::Reject, "ops", now()).unwrap();
    assert_eq!(patch.approval_status, ApprovalStatus::Rejected);
    assert_eq!(patch.status, AdStatus::Pending);

    let approved = ad_in(AdStatus::Active, ApprovalStatus::Approved);
    let err = plan_ad(&approved, Action::Reject, "ops", now()).unwrap_err();
    assert!(matches!(err, TransitionError::NotAllowed { .. }));
}

#[test]
fn deleted_ad_is_terminal_except_reset() {
    let ad = ad_in(AdStatus::Deleted, ApprovalStatus::Cancelled);
    for action in [Action::Approve, Action::Pause, Action::Resume, Action::Cancel] {
        assert!(plan_ad(&ad, action, "ops", now()).is_err(), "{action} should be refused");
    }
    assert!(plan_ad(&ad, Action::Reset, "ops", now()).is_ok());
}

#[test]
fn pause_accepted_from_approved_and_active_ads() {
    for status in [AdStatus::Approved, AdStatus::Active] {
        let ad = ad_in(status, ApprovalStatus::Approved);
        let patch = plan_ad(&ad, Action::Pause, "ops", now()).unwrap();
        assert_eq!(patch.status, AdStatus::Paused);
        assert_eq!(patch.approval_status, ApprovalStatus::Approved);
        assert_eq!(patch.approved_by.as_deref(), Some("earlier@ops.test"));
    }
}

#[test]
fn pausing_an_already_paused_ad_is_refused() {
    let ad = ad_in(AdStatus::Paused, ApprovalStatus::Approved);
    let err = plan_ad(&ad, Action::Pause, "ops", now()).unwrap_err();
    assert_eq!(err.error_code(), "E_TRANSITION_NOT_ALLOWED");
    assert!(err.to_string().contains("PAUSED/APPROVED"));
}

#[test]
fn archive_is_unsupported_for_ads() {
    let ad = ad_in(AdStatus::Active, ApprovalStatus::Approved);
    let err = plan_ad(&ad, Action::Archive, "ops", now()).unwrap_err();
    assert_eq!(err, TransitionError::Unsupported { kind: EntityKind::GoogleAdVariation, action: Action::Archive });
}

#[test]
fn reset_from_every_non_initial_ad_state_clears_approver() {
    for status in AdStatus::ALL {
        for approval_status in ApprovalStatus::ALL {
            if *status == AdStatus::Pending && *approval_status == ApprovalStatus::Pending {
                continue;
            }
            let ad = ad_in(*status, *approval_status);
            let patch = plan_ad(&ad, Action::Reset, "ops", now()).unwrap();
            assert_eq!(patch.status, AdStatus::Pending);
            assert_eq!(patch.approval_status, ApprovalStatus::Pending);
            assert!(patch.approved_by.is_none());
            assert!(patch.approved_at.is_none());
        }
    }
}

#[test]
fn reset_from_initial_ad_state_is_refused() {
    let ad = test_helpers::ad_variation();
    assert!(matches!(plan_ad(&ad, Action::Reset, "ops", now()), Err(TransitionError::NotAllowed { .. })));
}

// =========================================================================
// LinkedIn campaigns
// =========================================================================

#[test]
fn complete_campaign_has_no_missing_fields() {
    assert!(linkedin_missing_fields(&test_helpers::linkedin_campaign()).is_empty());
}

#[test]
fn missing_fields_lists_budget_schedule_and_targeting() {
    let campaign = LinkedInCampaign {
        daily_budget: None,
        start_date: None,
        target_locations: vec![],
        target_industries: vec![],
        target_job_titles: vec![],
        target_company_sizes: vec![],
        ..test_helpers::linkedin_campaign()
    };
    assert_eq!(linkedin_missing_fields(&campaign), vec!["daily_budget", "start_date", "targeting"]);
}

#[test]
fn zero_budget_counts_as_missing() {
    let campaign = LinkedInCampaign { daily_budget: Some(0.0), ..test_helpers::linkedin_campaign() };
    assert_eq!(linkedin_missing_fields(&campaign), vec!["daily_budget"]);
}

#[test]
fn any_targeting_list_satisfies_guard() {
    let campaign = LinkedInCampaign {
        target_locations: vec![],
        target_industries: vec![],
        target_job_titles: vec!["CTO".into()],
        target_company_sizes: vec![],
        ..test_helpers::linkedin_campaign()
    };
    assert!(linkedin_missing_fields(&campaign).is_empty());
}

#[test]
fn approve_without_daily_budget_is_refused_with_field_list() {
    let campaign = LinkedInCampaign { daily_budget: None, ..test_helpers::linkedin_campaign() };
    let err = plan_linkedin(&campaign, Action::Approve, "ops", now()).unwrap_err();
    assert_eq!(err, TransitionError::MissingFields(vec!["daily_budget"]));
    assert_eq!(err.error_code(), "E_MISSING_FIELDS");
    assert_eq!(err.to_string(), "missing required fields: daily_budget");
}

#[test]
fn approving_campaign_queues_it_for_platform_review() {
    let campaign = test_helpers::linkedin_campaign();
    let patch = plan_linkedin(&campaign, Action::Approve, "ops", now()).unwrap();
    assert_eq!(patch.approval_status, ApprovalStatus::Approved);
    assert_eq!(patch.linkedin_campaign_status, LinkedInCampaignStatus::PendingReview);
    assert_eq!(patch.automation_status.as_deref(), Some(AUTOMATION_QUEUED));
    assert!(patch.automation_error.is_none());
    assert_eq!(patch.approved_by.as_deref(), Some("ops"));
}

#[test]
fn approving_already_approved_campaign_is_refused_before_field_check() {
    let campaign = LinkedInCampaign {
        daily_budget: None,
        ..campaign_in(ApprovalStatus::Approved, LinkedInCampaignStatus::Active)
    };
    let err = plan_linkedin(&campaign, Action::Approve, "ops", now()).unwrap_err();
    assert!(matches!(err, TransitionError::NotAllowed { .. }));
}

#[test]
fn decline_keeps_platform_status() {
    let campaign = test_helpers::linkedin_campaign();
    let patch = plan_linkedin(&campaign, Action::Reject, "ops", now()).unwrap();
    assert_eq!(patch.approval_status, ApprovalStatus::Rejected);
    assert_eq!(patch.linkedin_campaign_status, LinkedInCampaignStatus::Draft);
}

#[test]
fn campaign_lifecycle_activate_pause_archive() {
    let approved = campaign_in(ApprovalStatus::Approved, LinkedInCampaignStatus::PendingReview);
    let patch = plan_linkedin(&approved, Action::Resume, "ops", now()).unwrap();
    assert_eq!(patch.linkedin_campaign_status, LinkedInCampaignStatus::Active);

    let active = campaign_in(ApprovalStatus::Approved, LinkedInCampaignStatus::Active);
    let patch = plan_linkedin(&active, Action::Pause, "ops", now()).unwrap();
    assert_eq!(patch.linkedin_campaign_status, LinkedInCampaignStatus::Paused);
    assert_eq!(patch.approval_status, ApprovalStatus::Approved);

    let paused = campaign_in(ApprovalStatus::Approved, LinkedInCampaignStatus::Paused);
    let patch = plan_linkedin(&paused, Action::Archive, "ops", now()).unwrap();
    assert_eq!(patch.linkedin_campaign_status, LinkedInCampaignStatus::Archived);
}

#[test]
fn cancel_refused_for_archived_campaign() {
    let archived = campaign_in(ApprovalStatus::Approved, LinkedInCampaignStatus::Archived);
    assert!(plan_linkedin(&archived, Action::Cancel, "ops", now()).is_err());

    let active = campaign_in(ApprovalStatus::Approved, LinkedInCampaignStatus::Active);
    let patch = plan_linkedin(&active, Action::Cancel, "ops", now()).unwrap();
    assert_eq!(patch.approval_status, ApprovalStatus::Cancelled);
    assert_eq!(patch.linkedin_campaign_status, LinkedInCampaignStatus::Cancelled);
}

#[test]
fn freshly_approved_campaign_can_be_paused() {
    for status in [LinkedInCampaignStatus::PendingReview, LinkedInCampaignStatus::Draft, LinkedInCampaignStatus::Active] {
        let campaign = campaign_in(ApprovalStatus::Approved, status);
        let patch = plan_linkedin(&campaign, Action::Pause, "ops", now()).unwrap();
        assert_eq!(patch.linkedin_campaign_status, LinkedInCampaignStatus::Paused);
        assert_eq!(patch.approval_status, ApprovalStatus::Approved);
    }
    let paused = campaign_in(ApprovalStatus::Approved, LinkedInCampaignStatus::Paused);
    assert!(plan_linkedin(&paused, Action::Pause, "ops", now()).is_err());
}

#[test]
fn pause_requires_approval() {
    let pending_active = campaign_in(ApprovalStatus::Pending, LinkedInCampaignStatus::Active);
    assert!(plan_linkedin(&pending_active, Action::Pause, "ops", now()).is_err());
}

#[test]
fn reset_campaign_clears_approver_and_automation_state() {
    let campaign = LinkedInCampaign {
        approved_by: Some("ops".into()),
        approved_at: Some(now()),
        automation_status: Some("failed".into()),
        automation_error: Some("token expired".into()),
        ..campaign_in(ApprovalStatus::Approved, LinkedInCampaignStatus::Active)
    };
    let patch = plan_linkedin(&campaign, Action::Reset, "ops", now()).unwrap();
    assert_eq!(patch.approval_status, ApprovalStatus::Pending);
    assert_eq!(patch.linkedin_campaign_status, LinkedInCampaignStatus::Draft);
    assert!(patch.approved_by.is_none());
    assert!(patch.approved_at.is_none());
    assert!(patch.automation_status.is_none());
    assert!(patch.automation_error.is_none());
}

#[test]
fn reset_from_every_non_initial_campaign_state_returns_pending() {
    for approval_status in ApprovalStatus::ALL {
        for status in LinkedInCampaignStatus::ALL {
            if *approval_status == ApprovalStatus::Pending && *status == LinkedInCampaignStatus::Draft {
                continue;
            }
            let campaign = campaign_in(*approval_status, *status);
            let patch = plan_linkedin(&campaign, Action::Reset, "ops", now()).unwrap();
            assert_eq!(patch.approval_status, ApprovalStatus::Pending);
            assert!(patch.approved_by.is_none());
        }
    }
}

// =========================================================================
// Content
// =========================================================================

#[test]
fn content_review_round() {
    let item = test_helpers::content_item(ContentKind::BlogPost);
    let approved = plan_content(&item, Action::Approve, "editor", now()).unwrap();
    assert_eq!(approved.status, ContentStatus::Approved);
    assert_eq!(approved.reviewed_by.as_deref(), Some("editor"));

    let rejected = plan_content(&item, Action::Reject, "editor", now()).unwrap();
    assert_eq!(rejected.status, ContentStatus::Rejected);
}

#[test]
fn content_reset_clears_reviewer() {
    let item = ContentItem {
        status: ContentStatus::Rejected,
        reviewed_by: Some("editor".into()),
        reviewed_at: Some(now()),
        ..test_helpers::content_item(ContentKind::LinkedinPost)
    };
    let patch = plan_content(&item, Action::Reset, "editor", now()).unwrap();
    assert_eq!(patch.status, ContentStatus::Unused);
    assert!(patch.reviewed_by.is_none());
    assert!(patch.reviewed_at.is_none());
}

#[test]
fn content_cannot_be_approved_twice_or_paused() {
    let item = ContentItem { status: ContentStatus::Approved, ..test_helpers::content_item(ContentKind::BlogPost) };
    assert!(matches!(
        plan_content(&item, Action::Approve, "editor", now()),
        Err(TransitionError::NotAllowed { .. })
    ));
    assert!(matches!(
        plan_content(&item, Action::Pause, "editor", now()),
        Err(TransitionError::Unsupported { kind: EntityKind::BlogPost, .. })
    ));
}

#[test]
fn unused_content_reset_is_refused() {
    let item = test_helpers::content_item(ContentKind::BlogPost);
    assert!(plan_content(&item, Action::Reset, "editor", now()).is_err());
}
