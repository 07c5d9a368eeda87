//! Mapping drafts onto the backend's request vocabularies.
//!
//! The event alert endpoint speaks urgency (`low`..`critical`) and has no
//! notion of targeting or scheduling. The targeted endpoint takes the
//! draft's own priority, target and schedule.

use aegis_compose::{AlertDraft, Priority, TargetSpec};
use aegis_config::{BackendConfig, BackendContract};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::api_types::{EventAlertRequest, TargetedAlertRequest, WireLocation, WireTarget};
use crate::error::{BackendError, Result};

/// Urgency levels accepted by `POST /alert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl From<Priority> for Urgency {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Info => Urgency::Low,
            Priority::Warning => Urgency::Medium,
            Priority::Emergency => Urgency::Critical,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A draft mapped onto the configured contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlertRequest {
    Event(EventAlertRequest),
    Targeted(TargetedAlertRequest),
}

impl AlertRequest {
    /// Map `draft` the way `config.contract` requires.
    pub fn for_contract(draft: &AlertDraft, config: &BackendConfig) -> Result<Self> {
        match config.contract {
            BackendContract::EventAlert => event_alert_request(
                draft,
                &config.default_event_name,
                config.event_slug.as_deref(),
            )
            .map(AlertRequest::Event),
            BackendContract::TargetedAlert => {
                Ok(AlertRequest::Targeted(targeted_alert_request(draft)))
            }
        }
    }

    /// Endpoint the request is posted to.
    pub fn path(&self) -> &'static str {
        match self {
            AlertRequest::Event(_) => "/alert",
            AlertRequest::Targeted(_) => "/alerts",
        }
    }
}

/// Build a `POST /alert` body.
///
/// Fails with [`BackendError::Unsupported`] for targeted or scheduled drafts,
/// since this endpoint would broadcast them to everyone immediately.
pub fn event_alert_request(
    draft: &AlertDraft,
    default_event_name: &str,
    default_event_slug: Option<&str>,
) -> Result<EventAlertRequest> {
    if draft.target != TargetSpec::All {
        return Err(BackendError::Unsupported(format!(
            "The event alert backend cannot target '{}'; it alerts every registered attendee",
            draft.target.kind().tag()
        )));
    }
    if draft.scheduled_for.is_some() {
        return Err(BackendError::Unsupported(
            "The event alert backend cannot schedule alerts; they are sent immediately".to_string(),
        ));
    }

    let event_name = draft
        .trimmed_title()
        .unwrap_or(default_event_name)
        .to_string();
    let event_slug = draft
        .event_slug
        .as_deref()
        .or(default_event_slug)
        .map(str::to_string);

    Ok(EventAlertRequest {
        mode: draft.delivery_method,
        event_name,
        description: draft.trimmed_message().to_string(),
        urgency: draft.priority.into(),
        event_slug,
    })
}

/// Build a `POST /alerts` body.
pub fn targeted_alert_request(draft: &AlertDraft) -> TargetedAlertRequest {
    let location = draft
        .target
        .location_area()
        .map(|(center, radius)| WireLocation {
            latitude: center.latitude,
            longitude: center.longitude,
            radius,
        });

    TargetedAlertRequest {
        message: draft.trimmed_message().to_string(),
        priority: draft.priority,
        method: draft.delivery_method,
        target: WireTarget {
            kind: draft.target.kind(),
            value: draft.target.selector_value(),
            location,
        },
        scheduled_for: draft
            .scheduled_for
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
}
