//! The in-progress alert an operator is composing.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::target::{Selection, TargetKind, TargetSpec, UnknownVariant};

/// Longest message body the backend accepts, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Longest title (event name) the backend accepts, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Alert priority as chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// General information
    #[default]
    Info,
    /// Important notice
    Warning,
    /// Immediate action required
    Emergency,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Info => "info",
            Priority::Warning => "warning",
            Priority::Emergency => "emergency",
        }
    }

    /// Badge text shown in previews.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Info => "INFO",
            Priority::Warning => "WARNING",
            Priority::Emergency => "EMERGENCY",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Priority::Info => "General information",
            Priority::Warning => "Important notice",
            Priority::Emergency => "Immediate action required",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Priority::Info),
            "warning" => Ok(Priority::Warning),
            "emergency" => Ok(Priority::Emergency),
            _ => Err(UnknownVariant {
                value: s.to_string(),
                allowed: &["info", "warning", "emergency"],
            }),
        }
    }
}

/// How recipients are contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// SMS
    #[default]
    Text,
    /// Voice call
    Call,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Text => "text",
            DeliveryMethod::Call => "call",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMethod::Text => "TEXT",
            DeliveryMethod::Call => "CALL",
        }
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "sms" => Ok(DeliveryMethod::Text),
            "call" | "voice" => Ok(DeliveryMethod::Call),
            _ => Err(UnknownVariant {
                value: s.to_string(),
                allowed: &["text", "call"],
            }),
        }
    }
}

/// An alert being composed.
///
/// Created empty when a compose session starts and mutated field by field.
/// Target field setters switch the target to their own kind first, so the
/// draft never holds fields from two target kinds at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlertDraft {
    /// Body delivered to recipients
    pub message: String,

    /// Short event name; blank means the configured default
    pub title: String,

    pub priority: Priority,

    pub delivery_method: DeliveryMethod,

    pub target: TargetSpec,

    /// Deliver later instead of immediately
    pub scheduled_for: Option<DateTime<Utc>>,

    /// Event FAQ context for voice calls
    pub event_slug: Option<String>,
}

impl AlertDraft {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_delivery_method(mut self, method: DeliveryMethod) -> Self {
        self.delivery_method = method;
        self
    }

    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_schedule(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_for = Some(at);
        self
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn set_delivery_method(&mut self, method: DeliveryMethod) {
        self.delivery_method = method;
    }

    pub fn set_schedule(&mut self, at: Option<DateTime<Utc>>) {
        self.scheduled_for = at;
    }

    /// Set the event slug. Blank input clears it.
    pub fn set_event_slug(&mut self, slug: impl Into<String>) {
        let slug = slug.into();
        self.event_slug = (!slug.trim().is_empty()).then(|| slug.trim().to_string());
    }

    /// Change the target kind, discarding the previous kind's fields.
    pub fn select_target(&mut self, kind: TargetKind) {
        self.target.switch_to(kind);
    }

    /// Set the medical condition from raw selector input.
    pub fn set_medical_condition(&mut self, raw: &str) {
        if let TargetSpec::MedicalCondition { condition } =
            self.target.switch_to(TargetKind::MedicalCondition)
        {
            *condition = Selection::parse(raw);
        }
    }

    /// Set the age group from raw selector input.
    pub fn set_age_group(&mut self, raw: &str) {
        if let TargetSpec::AgeGroup { group } = self.target.switch_to(TargetKind::AgeGroup) {
            *group = Selection::parse(raw);
        }
    }

    pub fn set_latitude(&mut self, value: Option<f64>) {
        if let TargetSpec::Location { latitude, .. } = self.target.switch_to(TargetKind::Location) {
            *latitude = value;
        }
    }

    pub fn set_longitude(&mut self, value: Option<f64>) {
        if let TargetSpec::Location { longitude, .. } = self.target.switch_to(TargetKind::Location)
        {
            *longitude = value;
        }
    }

    pub fn set_radius_meters(&mut self, value: Option<i64>) {
        if let TargetSpec::Location { radius_meters, .. } =
            self.target.switch_to(TargetKind::Location)
        {
            *radius_meters = value;
        }
    }

    pub fn set_criteria(&mut self, value: impl Into<String>) {
        if let TargetSpec::Custom { criteria } = self.target.switch_to(TargetKind::Custom) {
            *criteria = value.into();
        }
    }

    /// Message with surrounding whitespace removed.
    pub fn trimmed_message(&self) -> &str {
        self.message.trim()
    }

    /// Title with surrounding whitespace removed, if any remains.
    pub fn trimmed_title(&self) -> Option<&str> {
        let title = self.title.trim();
        (!title.is_empty()).then_some(title)
    }

    /// Whether the draft is still in its freshly created state.
    pub fn is_empty(&self) -> bool {
        *self == AlertDraft::default()
    }
}
