//! Live preview of a draft.
//!
//! [`preview`] is total: it renders whatever the operator has typed so far,
//! substituting placeholders for missing fields instead of failing.

use serde::Serialize;

use crate::draft::AlertDraft;
use crate::target::TargetSpec;

/// Shown in place of an empty message.
pub const MESSAGE_PLACEHOLDER: &str = "Your alert message will appear here...";

/// What an alert will look like once sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewSummary {
    /// Priority badge (`INFO`, `WARNING`, `EMERGENCY`)
    pub priority_label: String,

    /// What the priority means to recipients
    pub priority_description: String,

    /// Delivery badge (`TEXT`, `CALL`)
    pub delivery_label: String,

    /// Title, if one was entered
    pub title: Option<String>,

    /// Message text or [`MESSAGE_PLACEHOLDER`]
    pub message: String,

    /// Whether `message` is the placeholder
    pub message_is_placeholder: bool,

    /// Target tag with underscores as spaces, plus the selector value
    pub target_description: String,

    /// Operator-facing name of the target kind
    pub target_label: String,

    /// Circle covered by a complete location target
    pub target_area: Option<String>,

    /// RFC 3339 delivery time for scheduled alerts
    pub scheduled_for: Option<String>,

    pub event_slug: Option<String>,
}

/// Render a preview of `draft`.
pub fn preview(draft: &AlertDraft) -> PreviewSummary {
    let message = draft.trimmed_message();
    let message_is_placeholder = message.is_empty();

    PreviewSummary {
        priority_label: draft.priority.label().to_string(),
        priority_description: draft.priority.description().to_string(),
        delivery_label: draft.delivery_method.label().to_string(),
        title: draft.trimmed_title().map(str::to_string),
        message: if message_is_placeholder {
            MESSAGE_PLACEHOLDER.to_string()
        } else {
            message.to_string()
        },
        message_is_placeholder,
        target_description: describe_target(&draft.target),
        target_label: draft.target.kind().label().to_string(),
        target_area: draft
            .target
            .location_area()
            .map(|(center, radius)| format!("{radius}m around {center}")),
        scheduled_for: draft.scheduled_for.map(|at| at.to_rfc3339()),
        event_slug: draft.event_slug.clone(),
    }
}

/// `all`, `medical condition - asthma`, `custom - vip section`
pub fn describe_target(target: &TargetSpec) -> String {
    let tag = target.kind().tag().replace('_', " ");

    match target.selector_value() {
        Some(value) => format!("{tag} - {value}"),
        None => tag,
    }
}

impl std::fmt::Display for PreviewSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "[{}] [{}] {}",
            self.priority_label, self.delivery_label, self.priority_description
        )?;
        if let Some(title) = &self.title {
            writeln!(f, "{title}")?;
        }
        writeln!(f, "{}", self.message)?;
        write!(f, "Target: {} ({})", self.target_description, self.target_label)?;
        if let Some(area) = &self.target_area {
            write!(f, "\nArea: {area}")?;
        }
        if let Some(at) = &self.scheduled_for {
            write!(f, "\nScheduled for: {at}")?;
        }
        if let Some(slug) = &self.event_slug {
            write!(f, "\nEvent FAQ: {slug}")?;
        }
        Ok(())
    }
}
