//! Alert targeting.
//!
//! A [`TargetSpec`] declares who an alert should reach. Exactly one kind of
//! targeting is active at a time and each variant owns only its own fields,
//! so switching kinds can never leave stale selector data behind.
//!
//! Recipient resolution is the backend's job. Nothing here looks up users.

use std::str::FromStr;

use aegis_core::{GeoPoint, LATITUDE_RANGE, LONGITUDE_RANGE};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Discriminant of a [`TargetSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[default]
    All,
    MedicalCondition,
    AgeGroup,
    Location,
    Custom,
}

impl TargetKind {
    pub const ALL: [TargetKind; 5] = [
        TargetKind::All,
        TargetKind::MedicalCondition,
        TargetKind::AgeGroup,
        TargetKind::Location,
        TargetKind::Custom,
    ];

    /// Wire tag for this kind (`medical_condition`, `age_group`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            TargetKind::All => "all",
            TargetKind::MedicalCondition => "medical_condition",
            TargetKind::AgeGroup => "age_group",
            TargetKind::Location => "location",
            TargetKind::Custom => "custom",
        }
    }

    /// Human-readable label for selection lists.
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::All => "All Attendees",
            TargetKind::MedicalCondition => "Specific Medical Conditions",
            TargetKind::AgeGroup => "Age Group",
            TargetKind::Location => "Location-based",
            TargetKind::Custom => "Custom Selection",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TargetKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        TargetKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == normalized)
            .ok_or_else(|| UnknownVariant::new(s, &["all", "medical_condition", "age_group", "location", "custom"]))
    }
}

/// Medical conditions attendees may declare at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicalCondition {
    Asthma,
    Diabetes,
    HeartCondition,
    MobilityIssues,
    Pregnancy,
    Other,
}

impl MedicalCondition {
    pub const VALUES: &'static [&'static str] = &[
        "asthma",
        "diabetes",
        "heart_condition",
        "mobility_issues",
        "pregnancy",
        "other",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MedicalCondition::Asthma => "asthma",
            MedicalCondition::Diabetes => "diabetes",
            MedicalCondition::HeartCondition => "heart_condition",
            MedicalCondition::MobilityIssues => "mobility_issues",
            MedicalCondition::Pregnancy => "pregnancy",
            MedicalCondition::Other => "other",
        }
    }
}

impl FromStr for MedicalCondition {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "asthma" => Ok(MedicalCondition::Asthma),
            "diabetes" => Ok(MedicalCondition::Diabetes),
            "heart_condition" => Ok(MedicalCondition::HeartCondition),
            "mobility_issues" => Ok(MedicalCondition::MobilityIssues),
            "pregnancy" => Ok(MedicalCondition::Pregnancy),
            "other" => Ok(MedicalCondition::Other),
            _ => Err(UnknownVariant::new(s, Self::VALUES)),
        }
    }
}

/// Age brackets used for targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    /// Under 18
    Minors,
    /// 18 to 65
    Adults,
    /// Over 65
    Seniors,
}

impl AgeGroup {
    pub const VALUES: &'static [&'static str] = &["minors", "adults", "seniors"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Minors => "minors",
            AgeGroup::Adults => "adults",
            AgeGroup::Seniors => "seniors",
        }
    }
}

impl FromStr for AgeGroup {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "minors" => Ok(AgeGroup::Minors),
            "adults" => Ok(AgeGroup::Adults),
            "seniors" => Ok(AgeGroup::Seniors),
            _ => Err(UnknownVariant::new(s, Self::VALUES)),
        }
    }
}

/// A string that didn't match any member of an enumerated set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not one of: {}", .allowed.join(", "))]
pub struct UnknownVariant {
    pub value: String,
    pub allowed: &'static [&'static str],
}

impl UnknownVariant {
    fn new(value: &str, allowed: &'static [&'static str]) -> Self {
        Self {
            value: value.to_string(),
            allowed,
        }
    }
}

/// Operator's pick from an enumerated set, as entered.
///
/// Selection widgets start empty and free-text input may not parse, so both
/// states are kept until validation reports them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
    #[default]
    Unset,
    Chosen(T),
    Unrecognized(String),
}

impl<T: FromStr> Selection<T> {
    /// Parse raw input. Blank input is [`Selection::Unset`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Selection::Unset;
        }
        match raw.parse() {
            Ok(value) => Selection::Chosen(value),
            Err(_) => Selection::Unrecognized(raw.to_string()),
        }
    }
}

/// Who receives an alert.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TargetSpec {
    /// Every registered recipient
    #[default]
    All,
    MedicalCondition {
        condition: Selection<MedicalCondition>,
    },
    AgeGroup {
        group: Selection<AgeGroup>,
    },
    /// Everyone within `radius_meters` of a point. Fields stay optional while
    /// the operator is typing.
    Location {
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_meters: Option<i64>,
    },
    Custom {
        criteria: String,
    },
}

impl TargetSpec {
    /// A fresh, empty target of the given kind.
    pub fn empty(kind: TargetKind) -> Self {
        match kind {
            TargetKind::All => TargetSpec::All,
            TargetKind::MedicalCondition => TargetSpec::MedicalCondition {
                condition: Selection::Unset,
            },
            TargetKind::AgeGroup => TargetSpec::AgeGroup {
                group: Selection::Unset,
            },
            TargetKind::Location => TargetSpec::Location {
                latitude: None,
                longitude: None,
                radius_meters: None,
            },
            TargetKind::Custom => TargetSpec::Custom {
                criteria: String::new(),
            },
        }
    }

    pub fn medical_condition(condition: MedicalCondition) -> Self {
        TargetSpec::MedicalCondition {
            condition: Selection::Chosen(condition),
        }
    }

    pub fn age_group(group: AgeGroup) -> Self {
        TargetSpec::AgeGroup {
            group: Selection::Chosen(group),
        }
    }

    pub fn location(latitude: f64, longitude: f64, radius_meters: i64) -> Self {
        TargetSpec::Location {
            latitude: Some(latitude),
            longitude: Some(longitude),
            radius_meters: Some(radius_meters),
        }
    }

    pub fn custom(criteria: impl Into<String>) -> Self {
        TargetSpec::Custom {
            criteria: criteria.into(),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            TargetSpec::All => TargetKind::All,
            TargetSpec::MedicalCondition { .. } => TargetKind::MedicalCondition,
            TargetSpec::AgeGroup { .. } => TargetKind::AgeGroup,
            TargetSpec::Location { .. } => TargetKind::Location,
            TargetSpec::Custom { .. } => TargetKind::Custom,
        }
    }

    /// Switch to `kind`, discarding the previous variant's fields.
    ///
    /// Selecting the kind that's already active keeps its fields.
    pub fn switch_to(&mut self, kind: TargetKind) -> &mut Self {
        if self.kind() != kind {
            *self = TargetSpec::empty(kind);
        }
        self
    }

    /// The selector value as entered, if any (`asthma`, `seniors`, criteria text).
    pub fn selector_value(&self) -> Option<String> {
        match self {
            TargetSpec::All | TargetSpec::Location { .. } => None,
            TargetSpec::MedicalCondition { condition } => selection_text(condition, |c| c.as_str()),
            TargetSpec::AgeGroup { group } => selection_text(group, |g| g.as_str()),
            TargetSpec::Custom { criteria } => {
                let trimmed = criteria.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }

    /// Center and radius of a location target when all three are entered.
    pub fn location_area(&self) -> Option<(GeoPoint, i64)> {
        match self {
            TargetSpec::Location {
                latitude: Some(latitude),
                longitude: Some(longitude),
                radius_meters: Some(radius),
            } => Some((GeoPoint::new(*latitude, *longitude), *radius)),
            _ => None,
        }
    }
}

fn selection_text<T>(selection: &Selection<T>, name: impl Fn(&T) -> &'static str) -> Option<String> {
    match selection {
        Selection::Unset => None,
        Selection::Chosen(value) => Some(name(value).to_string()),
        Selection::Unrecognized(raw) => Some(raw.clone()),
    }
}

/// Check a target on its own, reporting the first problem.
pub fn validate_target(target: &TargetSpec) -> Result<(), ValidationError> {
    match target_violations(target).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Every problem with a target, in field order.
pub(crate) fn target_violations(target: &TargetSpec) -> Vec<ValidationError> {
    match target {
        TargetSpec::All => Vec::new(),
        TargetSpec::MedicalCondition { condition } => {
            selection_violation(condition, "condition", MedicalCondition::VALUES)
        }
        TargetSpec::AgeGroup { group } => selection_violation(group, "group", AgeGroup::VALUES),
        TargetSpec::Location {
            latitude,
            longitude,
            radius_meters,
        } => location_violations(*latitude, *longitude, *radius_meters),
        TargetSpec::Custom { criteria } => {
            if criteria.trim().is_empty() {
                vec![ValidationError::EmptyCriteria]
            } else {
                Vec::new()
            }
        }
    }
}

fn selection_violation<T>(
    selection: &Selection<T>,
    field: &'static str,
    allowed: &'static [&'static str],
) -> Vec<ValidationError> {
    let value = match selection {
        Selection::Chosen(_) => return Vec::new(),
        Selection::Unset => None,
        Selection::Unrecognized(raw) => Some(raw.clone()),
    };
    vec![ValidationError::InvalidEnumValue {
        field,
        value,
        allowed,
    }]
}

fn location_violations(
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_meters: Option<i64>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let missing: Vec<&'static str> = [
        ("latitude", latitude.is_none()),
        ("longitude", longitude.is_none()),
        ("radiusMeters", radius_meters.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();

    if !missing.is_empty() {
        errors.push(ValidationError::IncompleteLocation { missing });
    }

    if let Some(lat) = latitude.filter(|lat| !LATITUDE_RANGE.contains(lat)) {
        errors.push(ValidationError::InvalidRange {
            field: "latitude",
            value: lat,
            bounds: "[-90, 90]",
        });
    }

    if let Some(lon) = longitude.filter(|lon| !LONGITUDE_RANGE.contains(lon)) {
        errors.push(ValidationError::InvalidRange {
            field: "longitude",
            value: lon,
            bounds: "[-180, 180]",
        });
    }

    if let Some(radius) = radius_meters.filter(|radius| *radius <= 0) {
        errors.push(ValidationError::InvalidRange {
            field: "radiusMeters",
            value: radius as f64,
            bounds: "> 0",
        });
    }

    errors
}
