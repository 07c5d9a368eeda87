//! Local, pre-submission validation.
//!
//! Validation never talks to the backend. A draft that fails here is never
//! dispatched, and every violated constraint is reported at once so the
//! operator can fix them in a single pass.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::draft::{AlertDraft, MAX_MESSAGE_CHARS, MAX_TITLE_CHARS};
use crate::target::target_violations;

/// A constraint an alert draft violates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Message is empty after trimming
    #[error("Alert message must not be empty")]
    EmptyMessage,

    /// Message exceeds what the backend accepts
    #[error("Alert message is {length} characters, the limit is {max}")]
    MessageTooLong { length: usize, max: usize },

    /// Title exceeds what the backend accepts
    #[error("Alert title is {length} characters, the limit is {max}")]
    TitleTooLong { length: usize, max: usize },

    /// Selector is unset or not a member of its enumerated set
    #[error(
        "{field} must be one of {}, got {}",
        .allowed.join(", "),
        .value.as_deref().unwrap_or("nothing")
    )]
    InvalidEnumValue {
        field: &'static str,
        value: Option<String>,
        allowed: &'static [&'static str],
    },

    /// Numeric field outside its bounds
    #[error("{field} {value} is out of range {bounds}")]
    InvalidRange {
        field: &'static str,
        value: f64,
        bounds: &'static str,
    },

    /// Location target missing one or more of latitude/longitude/radius
    #[error("Location target is missing {}", .missing.join(", "))]
    IncompleteLocation { missing: Vec<&'static str> },

    /// Custom target criteria is empty after trimming
    #[error("Custom targeting criteria must not be empty")]
    EmptyCriteria,

    /// Scheduled delivery time is not in the future
    #[error("Scheduled time {scheduled_for} is not in the future")]
    ScheduledInPast { scheduled_for: DateTime<Utc> },
}

impl ValidationError {
    /// Stable identifier for UI layers and logs.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyMessage => "empty_message",
            ValidationError::MessageTooLong { .. } => "message_too_long",
            ValidationError::TitleTooLong { .. } => "title_too_long",
            ValidationError::InvalidEnumValue { .. } => "invalid_enum_value",
            ValidationError::InvalidRange { .. } => "invalid_range",
            ValidationError::IncompleteLocation { .. } => "incomplete_location",
            ValidationError::EmptyCriteria => "empty_criteria",
            ValidationError::ScheduledInPast { .. } => "scheduled_in_past",
        }
    }

    /// The draft field to highlight, where there is exactly one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::EmptyMessage | ValidationError::MessageTooLong { .. } => {
                Some("message")
            }
            ValidationError::TitleTooLong { .. } => Some("title"),
            ValidationError::InvalidEnumValue { field, .. }
            | ValidationError::InvalidRange { field, .. } => Some(*field),
            ValidationError::IncompleteLocation { .. } => None,
            ValidationError::EmptyCriteria => Some("criteria"),
            ValidationError::ScheduledInPast { .. } => Some("scheduledFor"),
        }
    }
}

/// Validate a draft against the current time.
pub fn validate_draft(draft: &AlertDraft) -> Result<(), Vec<ValidationError>> {
    validate_draft_at(draft, Utc::now())
}

/// Validate a draft as of `now`.
///
/// Returns every violated constraint: message, title, target, then schedule.
pub fn validate_draft_at(draft: &AlertDraft, now: DateTime<Utc>) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let message = draft.trimmed_message();
    if message.is_empty() {
        errors.push(ValidationError::EmptyMessage);
    } else {
        let length = message.chars().count();
        if length > MAX_MESSAGE_CHARS {
            errors.push(ValidationError::MessageTooLong {
                length,
                max: MAX_MESSAGE_CHARS,
            });
        }
    }

    if let Some(title) = draft.trimmed_title() {
        let length = title.chars().count();
        if length > MAX_TITLE_CHARS {
            errors.push(ValidationError::TitleTooLong {
                length,
                max: MAX_TITLE_CHARS,
            });
        }
    }

    errors.extend(target_violations(&draft.target));

    if let Some(scheduled_for) = draft.scheduled_for.filter(|at| *at <= now) {
        errors.push(ValidationError::ScheduledInPast { scheduled_for });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
