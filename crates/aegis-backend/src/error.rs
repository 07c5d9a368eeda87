//! Error types for the backend client.

use aegis_compose::{GENERIC_FAILURE_MESSAGE, SubmissionError};
use thiserror::Error;

use crate::roster::RegistrationError;

/// Backend client errors.
#[derive(Debug, Error)]
pub enum BackendError {
    // ===== Backend answered =====
    /// Non-2xx response
    #[error("Backend returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// 2xx response with `success: false`
    #[error("Backend declined the request: {}", .message.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Declined { message: Option<String> },

    /// Response body didn't match the expected shape
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    // ===== Transport =====
    /// Network timeout
    #[error("Network timeout after {0}s: {1}")]
    Timeout(u64, String),

    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Other HTTP client error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    // ===== Local =====
    /// The configured contract can't express this alert
    #[error("{0}")]
    Unsupported(String),

    /// Registration rejected before sending
    #[error("Invalid registration: {0}")]
    InvalidRegistration(#[from] RegistrationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BackendError {
    /// Classify a transport-level reqwest failure.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(timeout_secs, err.to_string())
        } else if err.is_connect() {
            BackendError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            BackendError::InvalidResponse(err.to_string())
        } else {
            BackendError::HttpError(err)
        }
    }

    /// Build a rejection from a non-2xx status and its raw body.
    ///
    /// Uses the body's `detail` string, else its `message` string, else the
    /// generic failure text.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        BackendError::Rejected {
            status,
            message: error_message_from_body(body)
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        }
    }

    /// HTTP status, when the backend answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Rejected { status, .. } => Some(*status),
            BackendError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Timeout(_, _) | BackendError::ConnectionFailed(_) => true,
            BackendError::Rejected { status, .. } => matches!(status, 408 | 429 | 500..=599),
            _ => false,
        }
    }

    /// Check if this error is a network-related error.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            BackendError::Timeout(_, _)
                | BackendError::ConnectionFailed(_)
                | BackendError::HttpError(_)
        )
    }

    /// Get a user-friendly error message.
    pub fn friendly_message(&self) -> String {
        match self {
            BackendError::Rejected { message, .. } => message.clone(),
            BackendError::Declined { message } => message
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            BackendError::Timeout(secs, _) => {
                format!("Request timed out after {}s. Check your connection.", secs)
            }
            BackendError::ConnectionFailed(_) => {
                "Could not reach the alert backend. Check that it is running.".to_string()
            }
            BackendError::InvalidRegistration(e) => e.to_string(),
            BackendError::Unsupported(msg) | BackendError::ConfigError(msg) => msg.clone(),
            _ => format!("Error: {}", self),
        }
    }

    /// Get suggested action for this error.
    pub fn suggested_action(&self) -> &'static str {
        match self {
            BackendError::Timeout(_, _) => "Check your network connection and try again.",
            BackendError::ConnectionFailed(_) => {
                "Verify backend.base_url in ~/.aegis/config.yaml or set AEGIS_BACKEND_URL."
            }
            BackendError::Rejected { status: 422, .. } => {
                "The backend rejected the request fields. Check the alert contents."
            }
            BackendError::Rejected { status: 500..=599, .. } => {
                "The backend or its messaging provider failed. Try again shortly."
            }
            BackendError::Unsupported(_) => {
                "Set backend.contract to targeted_alert, or send to all attendees immediately."
            }
            BackendError::ConfigError(_) => "Check your configuration file at ~/.aegis/config.yaml.",
            BackendError::InvalidRegistration(_) => "Correct the registration details and retry.",
            _ => "Try again or check the logs for details.",
        }
    }
}

/// Pull an operator-facing message out of an error body.
///
/// Non-string `detail` values (such as validation error lists) are ignored.
pub fn error_message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .filter_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

impl From<BackendError> for SubmissionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected { status, message } => {
                SubmissionError::rejected(Some(status), Some(message))
            }
            BackendError::Declined { message } => SubmissionError::rejected(None, message),
            BackendError::Unsupported(message) => SubmissionError::rejected(None, Some(message)),
            other => SubmissionError::transport(other.to_string()),
        }
    }
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
