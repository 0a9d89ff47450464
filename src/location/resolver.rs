//! Location resolver — walks the attempt ladder against a provider.
//!
//! Forward:  place+hint → "place, country"+hint → place → "place, country" → error
//! Reverse:  single lookup → settlement/country labels, empty on any failure

use tracing::{debug, info, warn};

use super::providers::{Candidate, GeocodingProvider, NominatimProvider, ReversePlace, SearchRequest};
use super::tables::{country_hint, normalize_country, normalize_place};
use super::types::{Coordinates, LocationError, LocationQuery, ProviderError, ReverseResult};
use crate::config::GeocoderConfig;

/// One rung of the ladder: the text sent and the optional country restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attempt {
    pub query: String,
    pub country_code: Option<&'static str>,
}

/// Stateless resolver. Cheap to share across threads.
pub struct LocationResolver<P = NominatimProvider> {
    provider: P,
}

impl LocationResolver<NominatimProvider> {
    pub fn new(config: &GeocoderConfig) -> Self {
        Self::with_provider(NominatimProvider::new(config))
    }
}

impl<P: GeocodingProvider> LocationResolver<P> {
    /// Create a resolver over any provider (stubs in tests).
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve a place and/or country to coordinates.
    pub fn resolve(&self, place: Option<&str>, country: Option<&str>) -> Result<Coordinates, LocationError> {
        self.resolve_query(&LocationQuery::new(place, country))
    }

    /// Resolve a [`LocationQuery`]; blank fields count as absent.
    pub fn resolve_query(&self, query: &LocationQuery) -> Result<Coordinates, LocationError> {
        let query = LocationQuery::new(query.place.as_deref(), query.country.as_deref());
        if query.is_empty() {
            return Err(LocationError::InvalidInput);
        }

        let place = query.place.as_deref().map(normalize_place);
        let country = query.country.as_deref();
        let hint = country.and_then(country_hint);
        let wanted_country = country.map(normalize_country);
        let label = query_label(place.as_deref(), country);

        let ladder = attempt_ladder(place.as_deref(), country, hint);
        debug!(%label, hint = hint.unwrap_or("-"), attempts = ladder.len(), "resolving location");

        let mut transport_failures = 0usize;
        let mut last_failure: Option<ProviderError> = None;

        for (i, attempt) in ladder.iter().enumerate() {
            let request = SearchRequest::new(attempt.query.as_str(), attempt.country_code);
            let candidates = match self.provider.search(&request) {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(attempt = i + 1, query = %attempt.query, error = %e, "geocoding attempt failed");
                    transport_failures += 1;
                    last_failure = Some(e);
                    continue;
                }
            };

            debug!(
                attempt = i + 1,
                query = %attempt.query,
                country_code = attempt.country_code.unwrap_or("-"),
                candidates = candidates.len(),
                "geocoding attempt answered"
            );

            let Some(hit) = pick_candidate(&candidates, hint, wanted_country.as_deref()) else {
                continue;
            };

            return match Coordinates::parse(&hit.lat, &hit.lon) {
                Some(coords) => {
                    info!(%label, attempt = i + 1, lat = coords.latitude, lon = coords.longitude, "location resolved");
                    Ok(coords)
                }
                None => {
                    warn!(%label, lat = %hit.lat, lon = %hit.lon, "accepted candidate has unusable coordinates");
                    Err(LocationError::NotFound(label))
                }
            };
        }

        if transport_failures == ladder.len() {
            let reason = last_failure.map_or_else(|| "no response".to_string(), |e| e.to_string());
            return Err(LocationError::ProviderUnavailable(reason));
        }

        info!(%label, "no acceptable candidate");
        Err(LocationError::NotFound(label))
    }

    /// Turn a map point into place/country labels. Never fails: any problem
    /// yields an all-empty [`ReverseResult`].
    pub fn reverse_resolve(&self, latitude: f64, longitude: f64) -> ReverseResult {
        match self.provider.reverse(latitude, longitude) {
            Ok(place) => reverse_result_from(place).unwrap_or_else(|| {
                warn!(latitude, longitude, "reverse lookup returned no address block");
                ReverseResult::default()
            }),
            Err(e) => {
                warn!(latitude, longitude, error = %e, "reverse lookup failed");
                ReverseResult::default()
            }
        }
    }
}

/// Build the ordered, de-duplicated list of query variants.
pub(crate) fn attempt_ladder(
    place: Option<&str>,
    country: Option<&str>,
    hint: Option<&'static str>,
) -> Vec<Attempt> {
    let place = place.filter(|p| !p.is_empty());
    let country = country.filter(|c| !c.is_empty());
    let combined = country.map(|c| match place {
        Some(p) => format!("{p}, {c}"),
        None => c.to_string(),
    });

    let mut ladder = Vec::with_capacity(4);
    let mut push = |query: &str, country_code: Option<&'static str>| {
        ladder.push(Attempt {
            query: query.to_string(),
            country_code,
        });
    };

    if let Some(code) = hint {
        if let Some(p) = place {
            push(p, Some(code));
        }
        if let Some(c) = combined.as_deref() {
            push(c, Some(code));
        }
    }
    if let Some(p) = place {
        push(p, None);
    }
    if let Some(c) = combined.as_deref() {
        push(c, None);
    }

    ladder.dedup();
    ladder
}

/// Does this candidate sit in the country the user asked for?
///
/// Exact code equality against the hint, or a case-insensitive substring
/// match between the candidate's country name and the user's text in
/// either direction. Approximate: "Congo" matches both Congos, and a
/// transliterated country name can miss.
pub(crate) fn country_matches(candidate: &Candidate, hint: Option<&str>, wanted: Option<&str>) -> bool {
    if let (Some(hint), Some(code)) = (hint, candidate.country_code()) {
        if code.trim().eq_ignore_ascii_case(hint) {
            return true;
        }
    }
    if let (Some(wanted), Some(name)) = (wanted, candidate.country()) {
        let name = normalize_country(name);
        if !wanted.is_empty() && !name.is_empty() && (name.contains(wanted) || wanted.contains(name.as_str())) {
            return true;
        }
    }
    false
}

/// Acceptance rule for one attempt's candidates.
fn pick_candidate<'c>(candidates: &'c [Candidate], hint: Option<&str>, wanted: Option<&str>) -> Option<&'c Candidate> {
    let matching = move || candidates.iter().find(|c| country_matches(c, hint, wanted));
    match (hint, wanted) {
        (Some(_), _) => matching(),
        (None, Some(_)) => matching().or_else(|| candidates.first()),
        (None, None) => candidates.first(),
    }
}

fn query_label(place: Option<&str>, country: Option<&str>) -> String {
    match (place, country) {
        (Some(p), Some(c)) => format!("{p}, {c}"),
        (Some(p), None) => p.to_string(),
        (None, Some(c)) => c.to_string(),
        (None, None) => String::new(),
    }
}

fn reverse_result_from(place: ReversePlace) -> Option<ReverseResult> {
    let address = place.address?;
    let display_name = place.display_name.unwrap_or_default();
    let label = address
        .settlement()
        .map_or_else(|| display_name.clone(), str::to_string);
    Some(ReverseResult {
        place: label,
        country: address.country.clone().unwrap_or_default(),
        country_code: address
            .country_code
            .as_deref()
            .map(|cc| cc.trim().to_uppercase())
            .unwrap_or_default(),
        display_name,
    })
}
