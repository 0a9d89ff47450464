//! Geocoding providers: the trait seam the resolver talks to, and the
//! OpenStreetMap Nominatim implementation.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{trace, warn};

use super::types::ProviderError;
use crate::config::GeocoderConfig;

/// Candidates requested per forward attempt.
pub const SEARCH_LIMIT: usize = 5;

// ─── Provider seam ──────────────────────────────────────────────

/// One forward-geocoding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query, e.g. `"Dahab, Egypt"`.
    pub query: String,
    /// Optional ISO alpha-2 restriction (`countrycodes=`), lowercase.
    pub country_code: Option<String>,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, country_code: Option<&str>) -> Self {
        Self {
            query: query.into(),
            country_code: country_code.map(str::to_lowercase),
            limit: SEARCH_LIMIT,
        }
    }
}

/// Anything that can turn text into places and places into text.
///
/// Implementations must be usable from several threads at once; the
/// resolver keeps no state of its own.
pub trait GeocodingProvider: Send + Sync {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>, ProviderError>;

    fn reverse(&self, latitude: f64, longitude: f64) -> Result<ReversePlace, ProviderError>;
}

impl<P: GeocodingProvider + ?Sized> GeocodingProvider for &P {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>, ProviderError> {
        (**self).search(request)
    }

    fn reverse(&self, latitude: f64, longitude: f64) -> Result<ReversePlace, ProviderError> {
        (**self).reverse(latitude, longitude)
    }
}

impl<P: GeocodingProvider + ?Sized> GeocodingProvider for Box<P> {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>, ProviderError> {
        (**self).search(request)
    }

    fn reverse(&self, latitude: f64, longitude: f64) -> Result<ReversePlace, ProviderError> {
        (**self).reverse(latitude, longitude)
    }
}

// ─── Wire types ─────────────────────────────────────────────────

/// A forward-search hit. Nominatim sends coordinates as strings; numbers
/// are accepted too, and anything else becomes an empty (unusable) string.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    #[serde(default, deserialize_with = "coordinate_text")]
    pub lat: String,
    #[serde(default, deserialize_with = "coordinate_text")]
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub address: Option<Address>,
}

impl Candidate {
    pub fn country(&self) -> Option<&str> {
        self.address.as_ref()?.country.as_deref()
    }

    pub fn country_code(&self) -> Option<&str> {
        self.address.as_ref()?.country_code.as_deref()
    }
}

fn coordinate_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Decode a search body element by element. A malformed entry is dropped
/// rather than failing the whole batch.
pub(crate) fn candidates_from(raw: Vec<Value>) -> Vec<Candidate> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!(index = i, error = %e, "skipping malformed geocoder candidate");
                None
            }
        })
        .collect()
}

/// The `address` block returned with `addressdetails=1`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub hamlet: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl Address {
    /// Most specific settlement name available, coarsest last.
    pub fn settlement(&self) -> Option<&str> {
        [&self.city, &self.town, &self.village, &self.hamlet, &self.county]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|name| !name.trim().is_empty())
    }
}

/// Body of a reverse lookup.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReversePlace {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    /// Present instead of a place when Nominatim cannot geocode the point.
    #[serde(default)]
    pub error: Option<String>,
}

// ─── Nominatim provider ─────────────────────────────────────────

/// Blocking client for an OpenStreetMap Nominatim instance.
pub struct NominatimProvider {
    agent: ureq::Agent,
    search_url: String,
    reverse_url: String,
}

impl NominatimProvider {
    pub fn new(config: &GeocoderConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build();
        Self {
            agent,
            search_url: config.search_url(),
            reverse_url: config.reverse_url(),
        }
    }

    /// Public nominatim.openstreetmap.org with default settings.
    pub fn public() -> Self {
        Self::new(&GeocoderConfig::default())
    }

    fn fetch<T: serde::de::DeserializeOwned>(&self, request: ureq::Request) -> Result<T, ProviderError> {
        trace!(url = request.url(), "geocoder request");
        let response = request.call().map_err(map_ureq_error)?;
        response
            .into_json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

impl GeocodingProvider for NominatimProvider {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Candidate>, ProviderError> {
        let mut call = self
            .agent
            .get(&self.search_url)
            .query("q", &request.query)
            .query("format", "json")
            .query("limit", &request.limit.to_string())
            .query("addressdetails", "1");
        if let Some(cc) = &request.country_code {
            call = call.query("countrycodes", cc);
        }
        let raw: Vec<Value> = self.fetch(call)?;
        Ok(candidates_from(raw))
    }

    fn reverse(&self, latitude: f64, longitude: f64) -> Result<ReversePlace, ProviderError> {
        let call = self
            .agent
            .get(&self.reverse_url)
            .query("lat", &latitude.to_string())
            .query("lon", &longitude.to_string())
            .query("format", "json")
            .query("addressdetails", "1");
        let mut place: ReversePlace = self.fetch(call)?;
        match place.error.take() {
            Some(msg) => Err(ProviderError::Rejected(msg)),
            None => Ok(place),
        }
    }
}

fn map_ureq_error(err: ureq::Error) -> ProviderError {
    match err {
        ureq::Error::Status(code, _) => ProviderError::Status(code),
        ureq::Error::Transport(t) => ProviderError::Network(t.to_string()),
    }
}
