//! Integration tests for the backend client against a mock HTTP server.
//!
//! These tests cover:
//! - Both alert request shapes
//! - Error body handling and transport failures
//! - Roster, locations, registration and health endpoints
//! - A compose session submitting through the real client
//! - Dry runs that map requests without posting them

use std::time::Duration;

use aegis_backend::{AegisClient, BackendError, LocationUpdate, Registration, RegistrationError};
use aegis_compose::{
    AlertDispatcher, AlertDraft, ComposeSession, DeliveryMethod, GENERIC_FAILURE_MESSAGE, Priority,
    SubmissionError, SubmissionState, SubmitOutcome, TargetSpec,
};
use aegis_config::{BackendConfig, BackendContract};
use serde_json::json;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

fn client_for(server: &MockServer, contract: BackendContract) -> AegisClient {
    let config = BackendConfig::default()
        .with_base_url(server.uri())
        .with_contract(contract);
    AegisClient::from_config(&config).unwrap()
}

// ============================================================
// Alert Submission
// ============================================================

#[tokio::test]
async fn test_targeted_location_alert() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/alerts"))
        .and(matchers::body_json(json!({
            "message": "Shelter in place",
            "priority": "emergency",
            "method": "call",
            "target": {
                "type": "location",
                "location": {"latitude": 37.7749, "longitude": -122.4194, "radius": 1000}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "alertId": "alert-77",
            "recipientsCount": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::TargetedAlert);
    let draft = AlertDraft::new("Shelter in place")
        .with_priority(Priority::Emergency)
        .with_delivery_method(DeliveryMethod::Call)
        .with_target(TargetSpec::location(37.7749, -122.4194, 1000));

    let receipt = client.send_alert(&draft).await.unwrap();
    assert_eq!(receipt.recipients_contacted, Some(12));
    assert_eq!(receipt.alert_id.as_deref(), Some("alert-77"));
}

#[tokio::test]
async fn test_success_false_is_declined() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/alert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "No registered numbers"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let result = client.dispatch(&AlertDraft::new("Test alert")).await;

    assert_eq!(
        result,
        Err(SubmissionError::Rejected {
            status: None,
            message: "No registered numbers".to_string(),
        })
    );
}

#[tokio::test]
async fn test_unconfirmed_reply_keeps_draft() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/alert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let draft = AlertDraft::new("Evacuate now").with_priority(Priority::Emergency);
    let mut session = ComposeSession::with_draft(draft.clone());

    let outcome = session.submit(&client).await;

    assert!(matches!(outcome, SubmitOutcome::Completed(ref r) if !r.success));
    assert_eq!(
        session.state(),
        &SubmissionState::Failed {
            error: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    );
    assert_eq!(session.error_message(), Some(GENERIC_FAILURE_MESSAGE));
    assert_eq!(session.draft(), &draft);
}

#[tokio::test]
async fn test_validation_error_list_falls_back_to_generic() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/alert"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "event_name"], "msg": "field required", "type": "missing"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let err = client.send_alert(&AlertDraft::new("Test alert")).await.unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert!(!err.is_retryable());
    assert_eq!(err.friendly_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_event_alert_contract_refuses_targeted_draft_without_request() {
    let server = MockServer::start().await;

    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let draft = AlertDraft::new("Gate C closed").with_target(TargetSpec::custom("volunteers"));

    let err = client.dispatch(&draft).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Rejected { status: None, .. }));
    assert!(err.to_string().contains("custom"));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let config = BackendConfig::default().with_base_url("http://127.0.0.1:1");
    let client = AegisClient::from_config(&config).unwrap();

    let err = client.send_alert(&AlertDraft::new("Test alert")).await.unwrap_err();
    assert!(err.is_network_error());

    let submission: SubmissionError = err.into();
    assert_eq!(submission.to_string(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = BackendConfig {
        base_url: server.uri(),
        timeout_secs: 1,
        ..Default::default()
    };
    let client = AegisClient::from_config(&config).unwrap();

    let err = client.health().await.unwrap_err();
    assert!(matches!(err, BackendError::Timeout(1, _)));
    assert!(err.is_retryable());
}

// ============================================================
// Roster, Locations, Registration, Health
// ============================================================

#[tokio::test]
async fn test_list_users() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_users": 2,
            "users": [
                {
                    "id": "u1", "full_name": "Sarah Johnson", "phone_number": "+15551234567",
                    "age": 34, "medical_information": "Asthma",
                    "registered_at": "2025-06-01T10:00:00Z"
                },
                {
                    "id": "u2", "full_name": "Mike Chen", "phone_number": "+15557654321",
                    "registered_at": "2025-06-01T10:05:00Z"
                }
            ],
            "hardcoded_numbers": ["+15550000001"]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let roster = client.list_users().await.unwrap();

    assert_eq!(roster.total_users, 2);
    assert_eq!(roster.reachable_count(), 3);
    assert!(roster.users[0].has_medical_information());
    assert!(!roster.users[1].has_medical_information());
}

#[tokio::test]
async fn test_list_locations_wrapped() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locations": [{
                "id": "u1", "full_name": "Sarah Johnson", "phone_number": "+15551234567",
                "latitude": 37.7749, "longitude": -122.4194,
                "last_updated": "2 min ago", "status": "offline"
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let locations = client.list_locations().await.unwrap();

    assert_eq!(locations.len(), 1);
    assert!(!locations[0].is_online());
}

#[tokio::test]
async fn test_update_location() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/location"))
        .and(matchers::body_json(json!({
            "user_id": "u1", "latitude": 37.78, "longitude": -122.41
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let update = LocationUpdate {
        user_id: "u1".to_string(),
        latitude: 37.78,
        longitude: -122.41,
    };
    assert_eq!(client.update_location(&update).await.unwrap().success, Some(true));
}

#[tokio::test]
async fn test_register_user() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/register"))
        .and(matchers::body_json(json!({
            "full_name": "Ada Lovelace",
            "phone_number": "+15551234567",
            "age": 36
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user_id": "u42",
            "message": "Registered"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let receipt = client
        .register_user(&Registration::new("Ada Lovelace", "+15551234567").with_age(36))
        .await
        .unwrap();

    assert_eq!(receipt.user_id.as_deref(), Some("u42"));
}

#[tokio::test]
async fn test_invalid_registration_is_not_sent() {
    let server = MockServer::start().await;

    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let err = client
        .register_user(&Registration::new("Ada Lovelace", "   "))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BackendError::InvalidRegistration(RegistrationError::MissingPhone)
    ));
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "registered_numbers": 2,
            "text_service": true,
            "voice_service": false
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let health = client.health().await.unwrap();

    assert!(health.is_healthy());
    assert_eq!(health.registered_numbers, 2);
    assert!(!health.supports(DeliveryMethod::Call));
}

// ============================================================
// Compose Session Through the Client
// ============================================================

#[tokio::test]
async fn test_session_success_through_client() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/alert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "sent",
            "recipients_contacted": 842
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let mut session = ComposeSession::with_draft(
        AlertDraft::new("Evacuate now").with_priority(Priority::Emergency),
    );

    let outcome = session.submit(&client).await;
    assert!(matches!(outcome, SubmitOutcome::Completed(ref r) if r.success));
    assert!(matches!(
        session.state(),
        SubmissionState::Success {
            recipients_contacted: Some(842),
            ..
        }
    ));
    assert!(session.draft().is_empty());
}

#[tokio::test]
async fn test_session_failure_through_client() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/alert"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "backend down"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, BackendContract::EventAlert);
    let draft = AlertDraft::new("Evacuate now").with_priority(Priority::Emergency);
    let mut session = ComposeSession::with_draft(draft.clone());

    session.submit(&client).await;
    assert_eq!(session.error_message(), Some("backend down"));
    assert_eq!(session.draft(), &draft);
}

#[tokio::test]
async fn test_dry_run_session_matches_real_send() {
    let server = MockServer::start().await;

    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let scheduled = AlertDraft::new("Shuttles leaving")
        .with_schedule(chrono::Utc::now() + chrono::TimeDelta::minutes(15));

    let dry_run = client_for(&server, BackendContract::EventAlert).dry_run();
    let mut session = ComposeSession::with_draft(scheduled.clone());
    let outcome = session.submit(&dry_run).await;

    assert!(matches!(outcome, SubmitOutcome::Completed(ref r) if !r.success));
    assert!(session.error_message().is_some_and(|e| e.contains("schedule")));
    assert_eq!(session.draft(), &scheduled);

    let dry_run = client_for(&server, BackendContract::TargetedAlert).dry_run();
    let mut session = ComposeSession::with_draft(scheduled);
    let outcome = session.submit(&dry_run).await;

    assert!(matches!(outcome, SubmitOutcome::Completed(ref r) if r.success));
    assert!(session.draft().is_empty());
}
