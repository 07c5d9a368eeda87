//! # aegis-compose
//!
//! Alert composition for the Aegis event-safety console.
//!
//! This crate provides:
//! - [`target`] - Who an alert reaches ([`TargetSpec`])
//! - [`draft`] - The alert being composed ([`AlertDraft`])
//! - [`validation`] - Local checks run before anything is sent
//! - [`preview`] - What the alert will look like
//! - [`dispatch`] - The [`AlertDispatcher`] seam to the backend
//! - [`session`] - The submit state machine ([`ComposeSession`])
//!
//! ## Example
//!
//! ```
//! use aegis_compose::{AlertDraft, ComposeSession, MockDispatcher, Priority, SubmitOutcome};
//!
//! # tokio_test_block(async {
//! let mut session = ComposeSession::with_draft(
//!     AlertDraft::new("Severe weather, move to the main hall").with_priority(Priority::Warning),
//! );
//! let dispatcher = MockDispatcher::delivering(120);
//!
//! match session.submit(&dispatcher).await {
//!     SubmitOutcome::Completed(result) => assert!(result.success),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

pub mod dispatch;
pub mod draft;
pub mod preview;
pub mod session;
pub mod target;
pub mod validation;

pub use dispatch::{
    AlertDispatcher, DeliveryReceipt, GENERIC_FAILURE_MESSAGE, MockDispatcher, SubmissionError,
};
pub use draft::{AlertDraft, DeliveryMethod, MAX_MESSAGE_CHARS, MAX_TITLE_CHARS, Priority};
pub use preview::{MESSAGE_PLACEHOLDER, PreviewSummary, describe_target, preview};
pub use session::{
    ComposeSession, SubmissionResult, SubmissionState, SubmitOutcome, SubmitStart,
};
pub use target::{
    AgeGroup, MedicalCondition, Selection, TargetKind, TargetSpec, UnknownVariant, validate_target,
};
pub use validation::{ValidationError, validate_draft, validate_draft_at};
