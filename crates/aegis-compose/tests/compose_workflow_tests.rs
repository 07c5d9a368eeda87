//! End-to-end tests for the compose workflow.
//!
//! These tests cover:
//! - Draft validation and preview for each target kind
//! - Submission through the session state machine with a mock dispatcher
//! - Error aggregation and variant isolation

use aegis_compose::{
    AlertDraft, ComposeSession, DeliveryReceipt, MESSAGE_PLACEHOLDER, MockDispatcher, Priority,
    SubmissionError, SubmissionResult, SubmissionState, SubmitOutcome, TargetKind, TargetSpec,
    ValidationError, preview, validate_draft, validate_draft_at,
};
use chrono::{Duration, TimeZone, Utc};

// ============================================================
// Validation and Preview
// ============================================================

#[test]
fn test_emergency_alert_to_everyone_is_valid() {
    let draft = AlertDraft::new("Evacuate now")
        .with_priority(Priority::Emergency)
        .with_target(TargetSpec::All);

    assert_eq!(validate_draft(&draft), Ok(()));
    assert_eq!(preview(&draft).target_description, "all");
}

#[tokio::test]
async fn test_empty_message_never_reaches_dispatcher() {
    let mut session = ComposeSession::with_draft(AlertDraft::new("").with_target(TargetSpec::All));
    let mock = MockDispatcher::delivering(5);

    let outcome = session.submit(&mock).await;

    assert_eq!(outcome, SubmitOutcome::Invalid(vec![ValidationError::EmptyMessage]));
    assert_eq!(mock.calls(), 0);
    assert_eq!(session.state(), &SubmissionState::Idle);
}

#[test]
fn test_location_radius_must_be_positive() {
    let mut draft =
        AlertDraft::new("Shelter in place").with_target(TargetSpec::location(37.7749, -122.4194, 1000));
    assert_eq!(validate_draft(&draft), Ok(()));

    draft.set_radius_meters(Some(0));
    let errors = validate_draft(&draft).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        ValidationError::InvalidRange {
            field: "radiusMeters",
            ..
        }
    ));
}

#[test]
fn test_validation_is_idempotent() {
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
    let mut draft = AlertDraft::new("");
    draft.set_age_group("toddlers");
    draft.set_schedule(Some(now - Duration::minutes(1)));

    let first = validate_draft_at(&draft, now);
    let second = validate_draft_at(&draft, now);
    assert_eq!(first, second);
    assert_eq!(first.unwrap_err().len(), 3);
}

#[test]
fn test_switching_target_kinds_discards_fields() {
    let mut draft = AlertDraft::new("Road closure on Main St");
    draft.set_latitude(Some(37.7749));
    draft.set_longitude(Some(-122.4194));
    draft.set_radius_meters(Some(1000));

    draft.select_target(TargetKind::Custom);
    assert_eq!(draft.target, TargetSpec::custom(""));

    draft.select_target(TargetKind::Location);
    assert_eq!(
        draft.target,
        TargetSpec::Location {
            latitude: None,
            longitude: None,
            radius_meters: None,
        }
    );
}

#[test]
fn test_preview_of_empty_draft() {
    let summary = preview(&AlertDraft::default());
    assert_eq!(summary.message, MESSAGE_PLACEHOLDER);
    assert_eq!(summary.target_description, "all");
    assert_eq!(summary.priority_label, "INFO");
}

#[test]
fn test_preview_is_total_for_partial_drafts() {
    let mut draft = AlertDraft::default();
    draft.set_latitude(Some(f64::NAN));
    draft.set_title("   ");
    let summary = preview(&draft);
    assert_eq!(summary.target_description, "location");
    assert!(summary.message_is_placeholder);

    draft.set_medical_condition("unknown-thing");
    assert_eq!(
        preview(&draft).target_description,
        "medical condition - unknown-thing"
    );
}

#[test]
fn test_empty_message_and_bad_latitude_both_reported() {
    let mut draft = AlertDraft::new("");
    draft.set_latitude(Some(100.0));
    draft.set_longitude(Some(0.0));
    draft.set_radius_meters(Some(100));

    let errors = validate_draft(&draft).unwrap_err();
    assert!(errors.len() >= 2);
    assert!(errors.contains(&ValidationError::EmptyMessage));
    assert!(errors.iter().any(|e| e.field() == Some("latitude")));
}

// ============================================================
// Submission Workflow
// ============================================================

#[tokio::test]
async fn test_successful_delivery_resets_draft() {
    let mut session = ComposeSession::with_draft(
        AlertDraft::new("Evacuate now").with_priority(Priority::Emergency),
    );
    let mock = MockDispatcher::delivering(842);

    let outcome = session.submit(&mock).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Completed(SubmissionResult {
            success: true,
            recipients_contacted: Some(842),
            error_message: None,
        })
    );
    assert!(matches!(
        session.state(),
        SubmissionState::Success {
            recipients_contacted: Some(842),
            ..
        }
    ));
    assert!(session.draft().is_empty());

    session.edit(|d| d.set_message("All clear"));
    assert_eq!(session.state(), &SubmissionState::Idle);
    assert_eq!(session.draft().message, "All clear");
}

#[tokio::test]
async fn test_backend_failure_preserves_draft() {
    let draft = AlertDraft::new("Evacuate now")
        .with_priority(Priority::Emergency)
        .with_target(TargetSpec::location(37.7749, -122.4194, 1000));
    let mut session = ComposeSession::with_draft(draft.clone());
    let mock = MockDispatcher::failing(SubmissionError::rejected(
        Some(500),
        Some("backend down".to_string()),
    ));

    let outcome = session.submit(&mock).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Completed(SubmissionResult {
            success: false,
            recipients_contacted: None,
            error_message: Some("backend down".to_string()),
        })
    );
    assert_eq!(session.error_message(), Some("backend down"));
    assert_eq!(session.draft(), &draft);
}

#[tokio::test]
async fn test_retry_after_failure_with_same_draft() {
    aegis_core::logging::init_test_logging();

    let mut session = ComposeSession::with_draft(AlertDraft::new("Gate C closed"));
    let mut mock = MockDispatcher::failing(SubmissionError::transport("connection refused"));

    session.submit(&mock).await;
    assert_eq!(session.error_message(), Some("Failed to send alert"));

    mock.set_outcome(Ok(DeliveryReceipt::contacted(10)));
    let outcome = session.submit(&mock).await;
    assert!(matches!(outcome, SubmitOutcome::Completed(SubmissionResult { success: true, .. })));
    assert_eq!(mock.calls(), 2);
}

#[test]
fn test_double_submit_is_dropped() {
    let mut session = ComposeSession::with_draft(AlertDraft::new("Lightning nearby"));
    let first = session.begin_submit();
    let second = session.begin_submit();

    assert!(matches!(first, aegis_compose::SubmitStart::Dispatch(_)));
    assert_eq!(second, aegis_compose::SubmitStart::AlreadySubmitting);

    let result = session.finish_submit(Ok(DeliveryReceipt::contacted(1)));
    assert!(result.is_some());
    assert_eq!(session.finish_submit(Ok(DeliveryReceipt::contacted(1))), None);
}
