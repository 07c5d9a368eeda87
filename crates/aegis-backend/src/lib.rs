//! # aegis-backend
//!
//! HTTP client for the Aegis alert backend.
//!
//! This crate provides:
//! - [`AegisClient`] - Sends alerts and reads roster, locations and health
//! - [`contract`] - Maps drafts onto the `/alert` and `/alerts` request shapes
//! - [`roster`] - Attendee, location and registration types
//! - [`BackendError`] - Classified HTTP and backend errors
//!
//! `AegisClient` implements [`aegis_compose::AlertDispatcher`], so a compose
//! session can submit through it directly. [`DryRunDispatcher`] runs the same
//! request mapping without posting anything.

pub mod api_types;
pub mod client;
pub mod contract;
pub mod error;
pub mod roster;

// Re-export main types
pub use api_types::{AlertResponse, EventAlertRequest, HealthStatus, TargetedAlertRequest};
pub use client::{AegisClient, DryRunDispatcher};
pub use contract::{AlertRequest, Urgency, event_alert_request, targeted_alert_request};
pub use error::{BackendError, Result, error_message_from_body};
pub use roster::{
    Acknowledgement, LocationStatus, LocationUpdate, RegisteredUser, Registration,
    RegistrationError, RegistrationReceipt, Roster, UserLocation, within_radius,
};
