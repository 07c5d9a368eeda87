//! Attendee roster, live locations and registration.
//!
//! These endpoints feed the operator's display only. Targeting never
//! consults them; recipient resolution stays on the backend.

use aegis_core::GeoPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Oldest age accepted at registration.
pub const MAX_AGE: u32 = 150;

/// A registered attendee as returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub medical_information: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub id_information: Option<String>,
    pub registered_at: String,
}

impl RegisteredUser {
    pub fn has_medical_information(&self) -> bool {
        self.medical_information
            .as_deref()
            .is_some_and(|info| !info.trim().is_empty())
    }
}

/// `GET /users` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub users: Vec<RegisteredUser>,
    /// Numbers the backend always alerts, outside the registry
    #[serde(default)]
    pub hardcoded_numbers: Vec<String>,
}

impl Roster {
    /// Everyone an untargeted alert would reach.
    pub fn reachable_count(&self) -> u64 {
        self.total_users.max(self.users.len() as u64) + self.hardcoded_numbers.len() as u64
    }
}

/// Whether an attendee's device reported recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    Online,
    Offline,
}

impl std::fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationStatus::Online => write!(f, "online"),
            LocationStatus::Offline => write!(f, "offline"),
        }
    }
}

/// An attendee's last reported position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub medical_information: Option<String>,
    /// Free-form, e.g. `2 min ago`
    pub last_updated: String,
    pub status: LocationStatus,
}

impl UserLocation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn is_online(&self) -> bool {
        self.status == LocationStatus::Online
    }
}

/// `GET /locations` answers either a bare list or a wrapped one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LocationsPayload {
    Bare(Vec<UserLocation>),
    Wrapped { locations: Vec<UserLocation> },
}

impl From<LocationsPayload> for Vec<UserLocation> {
    fn from(payload: LocationsPayload) -> Self {
        match payload {
            LocationsPayload::Bare(locations) | LocationsPayload::Wrapped { locations } => {
                locations
            }
        }
    }
}

/// Locations within `radius_meters` of `center`, nearest first.
pub fn within_radius(
    locations: &[UserLocation],
    center: GeoPoint,
    radius_meters: f64,
) -> Vec<(&UserLocation, f64)> {
    let mut nearby: Vec<_> = locations
        .iter()
        .map(|loc| (loc, center.distance_meters(&loc.point())))
        .filter(|(_, distance)| *distance <= radius_meters)
        .collect();
    nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
    nearby
}

/// `POST /location` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationUpdate {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A registration that failed local checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Full name is required")]
    MissingName,

    #[error("Phone number is required")]
    MissingPhone,

    #[error("Age {0} is out of range 0..=150")]
    AgeOutOfRange(u32),
}

/// `POST /register` body.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Registration {
    pub full_name: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_information: Option<String>,
}

impl Registration {
    pub fn new(full_name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            phone_number: phone_number.into(),
            ..Default::default()
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_medical_information(mut self, info: impl Into<String>) -> Self {
        self.medical_information = non_blank(info.into());
        self
    }

    pub fn with_emergency_contact(mut self, contact: impl Into<String>) -> Self {
        self.emergency_contact = non_blank(contact.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = non_blank(gender.into());
        self
    }

    /// Check required fields before sending.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.full_name.trim().is_empty() {
            return Err(RegistrationError::MissingName);
        }
        if self.phone_number.trim().is_empty() {
            return Err(RegistrationError::MissingPhone);
        }
        if let Some(age) = self.age.filter(|age| *age > MAX_AGE) {
            return Err(RegistrationError::AgeOutOfRange(age));
        }
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `POST /register` response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RegistrationReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
