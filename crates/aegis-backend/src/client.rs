//! HTTP client for the alert backend.
//!
//! [`AegisClient`] sends alerts using whichever request shape the configured
//! [`BackendContract`] names, and reads the roster, location and health
//! endpoints used by the operator console.
//!
//! ## Example
//!
//! ```no_run
//! use aegis_backend::AegisClient;
//! use aegis_compose::{AlertDraft, ComposeSession};
//! use aegis_config::BackendConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AegisClient::from_config(&BackendConfig::default())?;
//!
//! let mut session = ComposeSession::with_draft(AlertDraft::new("Doors open in 10 minutes"));
//! let outcome = session.submit(&client).await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

use ::async_trait::async_trait;
use aegis_compose::{AlertDispatcher, AlertDraft, DeliveryReceipt, SubmissionError};
use aegis_config::{BackendConfig, BackendContract};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api_types::{AlertResponse, HealthStatus};
use crate::contract::AlertRequest;
use crate::error::{BackendError, Result};
use crate::roster::{
    Acknowledgement, LocationUpdate, LocationsPayload, Registration, RegistrationReceipt, Roster,
    UserLocation,
};

/// Alert backend client using direct HTTP requests.
pub struct AegisClient {
    client: reqwest::Client,
    base_url: String,
    config: BackendConfig,
}

impl AegisClient {
    /// Create a client from backend config.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BackendError::ConfigError(
                "backend.base_url must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BackendError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    /// Wrap the client so alerts are mapped but never posted.
    pub fn dry_run(self) -> DryRunDispatcher {
        DryRunDispatcher { client: self }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn contract(&self) -> BackendContract {
        self.config.contract
    }

    /// The request `draft` maps to under the configured contract.
    pub fn alert_request(&self, draft: &AlertDraft) -> Result<AlertRequest> {
        AlertRequest::for_contract(draft, &self.config)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a 2xx JSON body.
    async fn send_request<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.config.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.config.timeout_secs))?;

        if !status.is_success() {
            warn!(path, status = status.as_u16(), "Backend request failed");
            return Err(BackendError::from_http_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(format!("{}: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("Sending GET request to {}{}", self.base_url, path);
        self.send_request(self.client.get(self.url(path)), path).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("Sending POST request to {}{}", self.base_url, path);
        self.send_request(self.client.post(self.url(path)).json(body), path)
            .await
    }

    /// Submit a validated draft using the configured contract.
    pub async fn send_alert(&self, draft: &AlertDraft) -> Result<DeliveryReceipt> {
        let request = self.alert_request(draft)?;
        let response: AlertResponse = match &request {
            AlertRequest::Event(body) => {
                debug!(urgency = %body.urgency, mode = %body.mode, "event alert");
                self.post_json(request.path(), body).await?
            }
            AlertRequest::Targeted(body) => {
                debug!(target_kind = body.target.kind.tag(), "targeted alert");
                self.post_json(request.path(), body).await?
            }
        };

        if !response.is_accepted() {
            warn!(success = ?response.success, "alert not confirmed by backend");
            return Err(BackendError::Declined {
                message: response.message,
            });
        }

        Ok(DeliveryReceipt {
            recipients_contacted: response.recipients_contacted,
            alert_id: response.alert_id_text(),
            message: response.message,
        })
    }

    /// Registered attendees.
    pub async fn list_users(&self) -> Result<Roster> {
        self.get_json("/users").await
    }

    /// Last known attendee positions.
    pub async fn list_locations(&self) -> Result<Vec<UserLocation>> {
        let payload: LocationsPayload = self.get_json("/locations").await?;
        Ok(payload.into())
    }

    /// Report an attendee's position.
    pub async fn update_location(&self, update: &LocationUpdate) -> Result<Acknowledgement> {
        let ack: Acknowledgement = self.post_json("/location", update).await?;
        if ack.success == Some(false) {
            return Err(BackendError::Declined {
                message: ack.message,
            });
        }
        Ok(ack)
    }

    /// Register an attendee. Local checks run first.
    pub async fn register_user(&self, registration: &Registration) -> Result<RegistrationReceipt> {
        registration.validate()?;
        let receipt: RegistrationReceipt = self.post_json("/register", registration).await?;
        if !receipt.success {
            return Err(BackendError::Declined {
                message: receipt.message,
            });
        }
        Ok(receipt)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/health").await
    }
}

#[async_trait]
impl AlertDispatcher for AegisClient {
    async fn dispatch(
        &self,
        draft: &AlertDraft,
    ) -> std::result::Result<DeliveryReceipt, SubmissionError> {
        self.send_alert(draft).await.map_err(SubmissionError::from)
    }

    fn name(&self) -> &str {
        match self.contract() {
            BackendContract::EventAlert => "event-alert",
            BackendContract::TargetedAlert => "targeted-alert",
        }
    }
}

/// Dispatcher that maps each draft exactly as [`AegisClient`] would, then
/// reports success without contacting the backend.
pub struct DryRunDispatcher {
    client: AegisClient,
}

#[async_trait]
impl AlertDispatcher for DryRunDispatcher {
    async fn dispatch(
        &self,
        draft: &AlertDraft,
    ) -> std::result::Result<DeliveryReceipt, SubmissionError> {
        let request = self.client.alert_request(draft)?;
        debug!(path = request.path(), "dry run, alert not posted");
        Ok(DeliveryReceipt {
            message: Some("Dry run, nothing was delivered".to_string()),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
