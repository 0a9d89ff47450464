//! Geocoder configuration. Owned by the caller (CLI / server), never read
//! by the resolver itself.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_GEOCODER_URL: &str = "HOBBYMAP_GEOCODER_URL";
pub const ENV_USER_AGENT: &str = "HOBBYMAP_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "HOBBYMAP_TIMEOUT_SECS";

/// Connection settings for the geocoding provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderConfig {
    /// Base URL without trailing slash, e.g. `https://nominatim.openstreetmap.org`
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("HobbyMap/{} (hobby-entry-map)", env!("CARGO_PKG_VERSION"))
}

impl GeocoderConfig {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    /// Build from `HOBBYMAP_*` environment variables, falling back to the
    /// defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self::new(
            load_or(ENV_GEOCODER_URL, lookup(ENV_GEOCODER_URL), defaults.base_url),
            load_or(ENV_USER_AGENT, lookup(ENV_USER_AGENT), defaults.user_agent),
            Duration::from_secs(load_or(ENV_TIMEOUT_SECS, lookup(ENV_TIMEOUT_SECS), DEFAULT_TIMEOUT_SECS)),
        )
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    pub fn reverse_url(&self) -> String {
        format!("{}/reverse", self.base_url)
    }
}

fn trim_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn load_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        debug!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}; using default: {default}");
        default
    })
}
