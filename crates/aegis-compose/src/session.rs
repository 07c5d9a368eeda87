//! Compose session: one operator, one draft, one submission at a time.
//!
//! ```text
//!            submit (valid)              delivered
//!   Idle ───────────────────▶ Submitting ──────────▶ Success ──┐
//!    ▲  ▲                          │                           │ edit / display window over
//!    │  │ submit (invalid):        │ failed                    │
//!    │  └─ stays Idle, errors kept ▼                           │
//!    └──────────────────────── Failed ◀─┘                      │
//!    ▲       edit / re-submit                                  │
//!    └─────────────────────────────────────────────────────────┘
//! ```
//!
//! `Submitting` is the only mutual exclusion: a submit while one is in
//! flight is ignored, not queued. The outbound call is not cancellable.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use aegis_core::log_alert_event;

use crate::dispatch::{AlertDispatcher, DeliveryReceipt, SubmissionError};
use crate::draft::AlertDraft;
use crate::preview::{PreviewSummary, preview};
use crate::validation::{ValidationError, validate_draft, validate_draft_at};

/// Default time a success banner stays up.
pub const DEFAULT_SUCCESS_DISPLAY_SECS: i64 = 5;

/// Where a session is in the submit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// Editable, nothing in flight
    Idle,
    /// A submission is in flight
    Submitting,
    /// Last submission was delivered; the draft has been reset
    Success {
        recipients_contacted: Option<u64>,
        shown_at: DateTime<Utc>,
    },
    /// Last submission failed; the draft is untouched
    Failed { error: String },
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Success { .. } => "success",
            SubmissionState::Failed { .. } => "failed",
        }
    }
}

/// Result of one delivery attempt, in the shape UI layers display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub success: bool,
    /// Present only on success
    pub recipients_contacted: Option<u64>,
    /// Present only on failure
    pub error_message: Option<String>,
}

impl SubmissionResult {
    pub fn delivered(receipt: &DeliveryReceipt) -> Self {
        Self {
            success: true,
            recipients_contacted: receipt.recipients_contacted,
            error_message: None,
        }
    }

    pub fn failed(error: &SubmissionError) -> Self {
        Self {
            success: false,
            recipients_contacted: None,
            error_message: Some(error.to_string()),
        }
    }
}

/// First half of a submit: what the host should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    /// Send this snapshot to the dispatcher, then call `finish_submit`
    Dispatch(AlertDraft),
    /// Draft failed validation; nothing was sent
    Invalid(Vec<ValidationError>),
    /// A submission is already in flight; this request was dropped
    AlreadySubmitting,
}

/// Outcome of [`ComposeSession::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Completed(SubmissionResult),
    Invalid(Vec<ValidationError>),
    Ignored,
}

/// An operator's compose session.
///
/// Owns the draft exclusively. Created when composing starts and dropped
/// when the operator leaves; nothing is persisted.
#[derive(Debug, Clone)]
pub struct ComposeSession {
    draft: AlertDraft,
    state: SubmissionState,
    validation_errors: Vec<ValidationError>,
    last_result: Option<SubmissionResult>,
    success_display: Duration,
}

impl Default for ComposeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeSession {
    /// Start a session with an empty draft.
    pub fn new() -> Self {
        Self::with_draft(AlertDraft::default())
    }

    /// Start a session from an existing draft.
    pub fn with_draft(draft: AlertDraft) -> Self {
        Self {
            draft,
            state: SubmissionState::Idle,
            validation_errors: Vec::new(),
            last_result: None,
            success_display: Duration::seconds(DEFAULT_SUCCESS_DISPLAY_SECS),
        }
    }

    /// Set how long the success state lasts before reverting to idle.
    pub fn with_success_display(mut self, window: Duration) -> Self {
        self.success_display = window;
        self
    }

    pub fn draft(&self) -> &AlertDraft {
        &self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    /// Error from the last failed submission, while still shown.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Errors that blocked the last submit attempt.
    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    pub fn last_result(&self) -> Option<&SubmissionResult> {
        self.last_result.as_ref()
    }

    /// Mutate the draft.
    ///
    /// Any edit clears a shown error or success banner and re-arms `Idle`.
    /// Edits during `Submitting` land in the draft but not in the snapshot
    /// already in flight.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut AlertDraft) -> R) -> R {
        let result = f(&mut self.draft);
        self.validation_errors.clear();
        if matches!(
            self.state,
            SubmissionState::Failed { .. } | SubmissionState::Success { .. }
        ) {
            debug!(from = self.state.name(), "edit re-armed session");
            self.state = SubmissionState::Idle;
        }
        result
    }

    /// Validate the current draft without changing state.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_draft(&self.draft)
    }

    pub fn preview(&self) -> PreviewSummary {
        preview(&self.draft)
    }

    /// Start a submission as of now.
    pub fn begin_submit(&mut self) -> SubmitStart {
        self.begin_submit_at(Utc::now())
    }

    /// Start a submission, validating as of `now`.
    ///
    /// Submitting from `Failed` or `Success` counts as the operator
    /// re-confirming: the banner clears and the attempt starts from `Idle`.
    pub fn begin_submit_at(&mut self, now: DateTime<Utc>) -> SubmitStart {
        match self.state {
            SubmissionState::Submitting => {
                debug!("submit ignored, submission already in flight");
                return SubmitStart::AlreadySubmitting;
            }
            SubmissionState::Failed { .. } | SubmissionState::Success { .. } => {
                self.state = SubmissionState::Idle;
            }
            SubmissionState::Idle => {}
        }

        if let Err(errors) = validate_draft_at(&self.draft, now) {
            log_alert_event!("validation_blocked", errors = errors.len());
            self.validation_errors = errors.clone();
            return SubmitStart::Invalid(errors);
        }

        self.validation_errors.clear();
        self.state = SubmissionState::Submitting;
        log_alert_event!(
            "submitted",
            priority = self.draft.priority.as_str(),
            method = self.draft.delivery_method.as_str(),
            target_kind = self.draft.target.kind().tag(),
            message_chars = self.draft.trimmed_message().chars().count()
        );
        SubmitStart::Dispatch(self.draft.clone())
    }

    /// Apply the dispatcher's answer as of now.
    pub fn finish_submit(
        &mut self,
        outcome: Result<DeliveryReceipt, SubmissionError>,
    ) -> Option<SubmissionResult> {
        self.finish_submit_at(outcome, Utc::now())
    }

    /// Apply the dispatcher's answer.
    ///
    /// Returns `None` when no submission was in flight.
    pub fn finish_submit_at(
        &mut self,
        outcome: Result<DeliveryReceipt, SubmissionError>,
        now: DateTime<Utc>,
    ) -> Option<SubmissionResult> {
        if !self.is_submitting() {
            warn!(state = self.state.name(), "delivery outcome with no submission in flight");
            return None;
        }

        let result = match outcome {
            Ok(receipt) => {
                log_alert_event!("delivered", recipients = receipt.recipients_contacted);
                self.draft = AlertDraft::default();
                self.state = SubmissionState::Success {
                    recipients_contacted: receipt.recipients_contacted,
                    shown_at: now,
                };
                SubmissionResult::delivered(&receipt)
            }
            Err(error) => {
                log_alert_event!("failed", status = error.status(), error = %error);
                if let SubmissionError::Transport { detail } = &error {
                    warn!(detail = %detail, "alert backend unreachable");
                }
                let result = SubmissionResult::failed(&error);
                self.state = SubmissionState::Failed {
                    error: error.to_string(),
                };
                result
            }
        };

        self.last_result = Some(result.clone());
        Some(result)
    }

    /// Validate, dispatch and apply the outcome.
    pub async fn submit(&mut self, dispatcher: &dyn AlertDispatcher) -> SubmitOutcome {
        let snapshot = match self.begin_submit() {
            SubmitStart::Dispatch(snapshot) => snapshot,
            SubmitStart::Invalid(errors) => return SubmitOutcome::Invalid(errors),
            SubmitStart::AlreadySubmitting => return SubmitOutcome::Ignored,
        };

        debug!(dispatcher = dispatcher.name(), "dispatching alert");
        let outcome = dispatcher.dispatch(&snapshot).await;

        match self.finish_submit(outcome) {
            Some(result) => SubmitOutcome::Completed(result),
            None => SubmitOutcome::Ignored,
        }
    }

    /// Revert `Success` to `Idle` once the display window has passed.
    ///
    /// Returns true if the state changed.
    pub fn expire_success(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            SubmissionState::Success { shown_at, .. } if now - shown_at >= self.success_display => {
                self.state = SubmissionState::Idle;
                true
            }
            _ => false,
        }
    }
}
