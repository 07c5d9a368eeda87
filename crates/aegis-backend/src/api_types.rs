//! Alert backend request and response types.
//!
//! This module contains the serde types for the two alert request shapes
//! and the responses the backend sends back.

use aegis_compose::{DeliveryMethod, Priority, TargetKind};
use serde::{Deserialize, Serialize};

use crate::contract::Urgency;

/// `POST /alert` body: one event-wide broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAlertRequest {
    pub mode: DeliveryMethod,
    pub event_name: String,
    pub description: String,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_slug: Option<String>,
}

/// `POST /alerts` body: a targeted, optionally scheduled alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetedAlertRequest {
    pub message: String,
    pub priority: Priority,
    pub method: DeliveryMethod,
    pub target: WireTarget,
    #[serde(rename = "scheduledFor", skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<String>,
}

/// Target in a [`TargetedAlertRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireTarget {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<WireLocation>,
}

/// Circle for location targets; `radius` is in meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: i64,
}

/// Response to either alert request.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AlertResponse {
    /// Only `Some(true)` confirms delivery
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "recipientsCount")]
    pub recipients_contacted: Option<u64>,
    #[serde(default, rename = "alertId")]
    pub alert_id: Option<serde_json::Value>,
}

impl AlertResponse {
    /// Whether the backend confirmed the alert went out.
    pub fn is_accepted(&self) -> bool {
        self.success == Some(true)
    }

    /// Alert id as text, whether the backend sent a string or a number.
    pub fn alert_id_text(&self) -> Option<String> {
        match self.alert_id.as_ref()? {
            serde_json::Value::String(id) => Some(id.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub registered_numbers: u64,
    /// SMS provider configured
    #[serde(default)]
    pub text_service: bool,
    /// Voice provider configured
    #[serde(default)]
    pub voice_service: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }

    /// Whether alerts can go out by `method`.
    pub fn supports(&self, method: DeliveryMethod) -> bool {
        match method {
            DeliveryMethod::Text => self.text_service,
            DeliveryMethod::Call => self.voice_service,
        }
    }
}
