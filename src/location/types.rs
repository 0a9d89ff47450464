//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A place/country pair as typed by the user. Either side may be missing,
/// but not both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuery {
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl LocationQuery {
    pub fn new(place: Option<&str>, country: Option<&str>) -> Self {
        Self {
            place: non_blank(place),
            country: non_blank(country),
        }
    }

    /// True when neither field carries any text.
    pub fn is_empty(&self) -> bool {
        self.place.is_none() && self.country.is_none()
    }
}

/// Trims the input and drops it entirely if nothing is left.
pub(crate) fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// A resolved map position. Always finite and within geographic range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting NaN, infinities and out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self { latitude, longitude })
    }

    /// Parse the string pair Nominatim hands back (`"48.8566"`, `"2.3522"`).
    pub fn parse(lat: &str, lon: &str) -> Option<Self> {
        let latitude = lat.trim().parse::<f64>().ok()?;
        let longitude = lon.trim().parse::<f64>().ok()?;
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

/// Human-readable labels for a point on the map.
///
/// Every field is an empty string when the lookup failed; callers treat the
/// result as a suggestion for pre-filling a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseResult {
    pub place: String,
    pub country: String,
    /// ISO 3166-1 alpha-2, uppercase (e.g. "FR")
    pub country_code: String,
    pub display_name: String,
}

impl ReverseResult {
    pub fn is_empty(&self) -> bool {
        self.place.is_empty()
            && self.country.is_empty()
            && self.country_code.is_empty()
            && self.display_name.is_empty()
    }
}

/// Location resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// Neither a place nor a country was given.
    #[error("Invalid input: provide a place, a country, or both")]
    InvalidInput,
    /// The provider answered but nothing acceptable came back.
    #[error("Location not found: '{0}'")]
    NotFound(String),
    /// Every attempt failed at the transport level.
    #[error("Geocoding provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl LocationError {
    /// Only transport failures are worth retrying with the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }
}

/// Failures talking to the geocoding provider. These never escape the
/// resolver directly; they are folded into [`LocationError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider returned HTTP {0}")]
    Status(u16),
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
    /// Nominatim answers some bad requests with 200 and `{"error": "..."}`.
    #[error("Provider rejected request: {0}")]
    Rejected(String),
}
