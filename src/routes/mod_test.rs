use super::*;

#[test]
fn not_found_maps_to_404() {
    let err = ServiceError::not_found(EntityKind::GoogleAdVariation, Uuid::nil());
    let api = ApiError::from(err);
    assert_eq!(api.status, StatusCode::NOT_FOUND);
    assert_eq!(api.body.code, "E_NOT_FOUND");
}

#[test]
fn database_failure_maps_to_500_and_is_retryable() {
    let api = ApiError::from(ServiceError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)));
    assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(api.body.retryable);
}

#[test]
fn transition_errors_map_by_kind() {
    let unsupported = TransitionError::Unsupported { kind: EntityKind::BlogPost, action: Action::Pause };
    assert_eq!(service_error_status(&unsupported.into()), StatusCode::BAD_REQUEST);

    let not_allowed =
        TransitionError::NotAllowed { kind: EntityKind::GoogleAdVariation, action: Action::Pause, from: "PENDING".into() };
    assert_eq!(service_error_status(&not_allowed.into()), StatusCode::CONFLICT);
}

#[test]
fn missing_fields_carry_details() {
    let err = ServiceError::Transition(TransitionError::MissingFields(vec!["daily_budget", "targeting"]));
    let api = ApiError::from(err);
    assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        api.body.details,
        Some(serde_json::json!({ "missing_fields": ["daily_budget", "targeting"] }))
    );
}

#[test]
fn unconfigured_collaborators_map_to_503() {
    assert_eq!(
        service_error_status(&ServiceError::NotConfigured("asset store")),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[test]
fn local_signing_refusal_is_internal_not_upstream() {
    let api = ApiError::from(ServiceError::Upload(UploadError::Signing("API secret is empty".into())));
    assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api.body.code, "E_UPLOAD_SIGNING");
    assert!(!api.body.retryable);

    let upstream = UploadError::Credential("signing service unavailable".into());
    assert_eq!(service_error_status(&upstream.into()), StatusCode::BAD_GATEWAY);
}

#[test]
fn upstream_failures_map_to_502() {
    let status = UploadError::Status { status: 500, body: String::new() };
    assert_eq!(service_error_status(&status.into()), StatusCode::BAD_GATEWAY);
}

#[test]
fn validation_and_conflict() {
    assert_eq!(
        service_error_status(&ServiceError::Validation("bad".into())),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(service_error_status(&ServiceError::Conflict("busy".into())), StatusCode::CONFLICT);
}

#[test]
fn parse_action_accepts_aliases() {
    assert_eq!(parse_action("decline").unwrap(), Action::Reject);
    assert_eq!(parse_action("activate").unwrap(), Action::Resume);
    let err = parse_action("APPROVE").unwrap_err();
    assert_eq!(err.body.code, "E_UNKNOWN_ACTION");
}

#[test]
fn confirmation_gate_prompts_with_entity_noun() {
    let id = Uuid::nil();
    let err = require_confirmation(ConfirmQuery::default(), EntityKind::LinkedinCampaign, id).unwrap_err();
    assert_eq!(err.status, StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(err.body.code, "E_CONFIRMATION_REQUIRED");
    assert!(err.body.message.contains("LinkedIn campaign"));
    assert!(err.body.message.contains("confirm=true"));

    assert!(require_confirmation(ConfirmQuery { confirm: true }, EntityKind::File, id).is_ok());
}

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[tokio::test]
async fn app_builds_with_test_state() {
    let app = crate::state::test_helpers::test_app();
    let _router = super::app(app.state.clone());
}
