//! The outbound seam between a compose session and the alert backend.
//!
//! [`AlertDispatcher`] is the one capability the session needs from the
//! outside world. `aegis-backend` implements it over HTTP. [`MockDispatcher`]
//! returns canned outcomes for tests and dry runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ::async_trait::async_trait;
use thiserror::Error;

use crate::draft::AlertDraft;

/// Shown when the backend gives no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to send alert";

/// What the backend reports after accepting an alert.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryReceipt {
    /// How many recipients were reached
    pub recipients_contacted: Option<u64>,

    /// Backend's confirmation text
    pub message: Option<String>,

    /// Backend identifier for the alert
    pub alert_id: Option<String>,
}

impl DeliveryReceipt {
    pub fn contacted(recipients: u64) -> Self {
        Self {
            recipients_contacted: Some(recipients),
            ..Default::default()
        }
    }
}

/// A submission the backend didn't accept.
///
/// The display text is what the operator sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Backend answered but refused or failed the alert
    #[error("{message}")]
    Rejected {
        status: Option<u16>,
        message: String,
    },

    /// Backend unreachable or its answer unreadable
    #[error("Failed to send alert")]
    Transport { detail: String },
}

impl SubmissionError {
    /// A rejection carrying the backend's message, or the generic one when
    /// the backend gave nothing usable.
    pub fn rejected(status: Option<u16>, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        SubmissionError::Rejected { status, message }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        SubmissionError::Transport {
            detail: detail.into(),
        }
    }

    /// HTTP status, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmissionError::Rejected { status, .. } => *status,
            SubmissionError::Transport { .. } => None,
        }
    }
}

/// Delivers a validated draft to whoever resolves recipients.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    /// Submit `draft`. Only called with drafts that passed validation.
    async fn dispatch(&self, draft: &AlertDraft) -> Result<DeliveryReceipt, SubmissionError>;

    /// Dispatcher name for logging.
    fn name(&self) -> &str;
}

/// Dispatcher that returns a fixed outcome and records what it was sent.
pub struct MockDispatcher {
    outcome: Result<DeliveryReceipt, SubmissionError>,
    calls: AtomicUsize,
    last_draft: Mutex<Option<AlertDraft>>,
}

impl MockDispatcher {
    /// Mock that reports `recipients` contacted.
    pub fn delivering(recipients: u64) -> Self {
        Self::with_outcome(Ok(DeliveryReceipt::contacted(recipients)))
    }

    /// Mock that fails every submission with `error`.
    pub fn failing(error: SubmissionError) -> Self {
        Self::with_outcome(Err(error))
    }

    pub fn with_outcome(outcome: Result<DeliveryReceipt, SubmissionError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_draft: Mutex::new(None),
        }
    }

    /// Replace the outcome returned from now on.
    pub fn set_outcome(&mut self, outcome: Result<DeliveryReceipt, SubmissionError>) {
        self.outcome = outcome;
    }

    /// Number of dispatches so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recently dispatched draft.
    pub fn last_draft(&self) -> Option<AlertDraft> {
        self.last_draft
            .lock()
            .map(|draft| draft.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::delivering(0)
    }
}

#[async_trait]
impl AlertDispatcher for MockDispatcher {
    async fn dispatch(&self, draft: &AlertDraft) -> Result<DeliveryReceipt, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.last_draft.lock() {
            Ok(mut slot) => *slot = Some(draft.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(draft.clone()),
        }
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
