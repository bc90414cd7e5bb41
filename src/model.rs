//! Data models for FloodAlert.
//!
//! The core types are [`AlertRecord`], which is one user-submitted flood
//! report, and [`FilterCriteria`], the immutable description of which
//! alerts a listing should show. The remaining types are the request and
//! response bodies of the HTTP API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name recorded when the creating session carries none.
pub const ANONYMOUS_USER_NAME: &str = "Anonymous user";

/// A latitude/longitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// The device's current position, used as the centre of the radius filter.
pub type ReferenceLocation = Coordinates;

/// Coarse hazard level chosen by the reporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Parse a stored severity label.
    ///
    /// Unknown or missing labels fall back to [`Severity::Medium`], the same
    /// default a report gets when the reporter picks nothing.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(l) if l.eq_ignore_ascii_case("low") => Severity::Low,
            Some(l) if l.eq_ignore_ascii_case("high") => Severity::High,
            _ => Severity::Medium,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user-submitted flood report.
///
/// `id`, `coordinates`, `created_at`, `user_id` and `user_name` are fixed
/// at creation. `city_name`, `message` and `severity` may only be changed
/// by the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Opaque identifier assigned by the store.
    pub id: i64,

    /// Free-text locality label, possibly `"<city> - <neighborhood>"`.
    pub city_name: String,

    pub coordinates: Coordinates,

    /// Description of the situation.
    pub message: String,

    #[serde(default)]
    pub severity: Severity,

    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,

    /// Time of the last edit by the owner, if any.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// Identifier of the creating user.
    pub user_id: String,

    /// Display name of the creator captured at creation time.
    pub user_name: String,
}

impl AlertRecord {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Which alerts a listing should show.
///
/// Criteria are rebuilt as a whole whenever the user toggles a filter.
/// Every active filter must pass for a record to be kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive literal substring to look for in `city_name`.
    pub city_name_substring: Option<String>,

    /// Keep only alerts within [`crate::geo::ALERT_RADIUS_KM`] of the
    /// reference location.
    pub within_radius: bool,

    /// Order by `created_at`, most recent first.
    pub sort_by_recency: bool,
}

impl FilterCriteria {
    pub fn with_city(mut self, substring: impl Into<String>) -> Self {
        self.city_name_substring = Some(substring.into());
        self
    }

    pub fn with_radius(mut self) -> Self {
        self.within_radius = true;
        self
    }

    pub fn with_recency_sort(mut self) -> Self {
        self.sort_by_recency = true;
        self
    }

    /// The city filter, if it has anything to match.
    pub fn city_filter(&self) -> Option<&str> {
        self.city_name_substring
            .as_deref()
            .filter(|substring| !substring.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.city_filter().is_none() && !self.within_radius && !self.sort_by_recency
    }
}

/// Request body for POST /alerts.
///
/// The session supplies the user; the server supplies the timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertRequest {
    pub message: String,

    pub latitude: f64,

    pub longitude: f64,

    /// May be left blank when a reverse geocoder is configured.
    #[serde(default)]
    pub city_name: String,

    /// Appended to the city as `"<city> - <neighborhood>"`.
    #[serde(default)]
    pub neighborhood: Option<String>,

    #[serde(default)]
    pub severity: Severity,
}

/// Request body for PUT /alerts/:id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAlertRequest {
    pub message: Option<String>,
    pub severity: Option<Severity>,
    pub city_name: Option<String>,
}

/// Response for a successful create or update.
#[derive(Debug, Clone, Serialize)]
pub struct AlertResponse {
    pub id: i64,
    pub message: String,
}

/// Query parameters for GET /alerts.
#[derive(Debug, Default, Deserialize)]
pub struct AlertListQuery {
    /// City substring filter.
    pub city: Option<String>,

    /// Apply the 5 km radius filter around `latitude`/`longitude`.
    #[serde(default)]
    pub nearby: bool,

    /// Sort by creation time, most recent first.
    #[serde(default)]
    pub recent: bool,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AlertListQuery {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            city_name_substring: self.city.clone(),
            within_radius: self.nearby,
            sort_by_recency: self.recent,
        }
    }
}

/// Query parameters for GET /alerts/nearby.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,

    /// Radius in kilometres (default: 5).
    #[serde(default = "default_radius_km")]
    pub radius: f64,
}

fn default_radius_km() -> f64 {
    crate::geo::ALERT_RADIUS_KM
}

/// Response for the alert listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertRecord>,

    pub count: usize,

    /// False when the radius filter was requested but no location was
    /// supplied, so every alert passed it.
    pub radius_applied: bool,
}
