//! Activity entries and the geocoding step of their create/edit workflow.
//!
//! Persistence lives elsewhere; this module only decides when an entry
//! needs (re)geocoding and fills in its coordinates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::location::types::non_blank;
use crate::location::{Coordinates, GeocodingProvider, LocationError, LocationResolver};

/// A single logged activity (a dive, a hike, a concert...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub hobby: String,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("Entry is missing {0}")]
    MissingField(&'static str),
    #[error("Geocoding failed: {0}")]
    Geocoding(#[from] LocationError),
}

impl Entry {
    /// Check the fields every stored entry must carry.
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.user_id.trim().is_empty() {
            return Err(EntryError::MissingField("userId"));
        }
        if self.title.trim().is_empty() {
            return Err(EntryError::MissingField("title"));
        }
        if non_blank(self.place.as_deref()).is_none() && non_blank(self.country.as_deref()).is_none() {
            return Err(EntryError::MissingField("place or country"));
        }
        Ok(())
    }

    /// Both coordinates, if the entry has a usable pair.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::new(self.latitude?, self.longitude?)
    }

    pub fn set_coordinates(&mut self, coords: Coordinates) {
        self.latitude = Some(coords.latitude);
        self.longitude = Some(coords.longitude);
    }

    /// Has the user changed where this happened, compared to `stored`?
    pub fn location_changed(&self, stored: &Self) -> bool {
        non_blank(self.place.as_deref()) != non_blank(stored.place.as_deref())
            || non_blank(self.country.as_deref()) != non_blank(stored.country.as_deref())
    }
}

/// Fills in entry coordinates through a [`LocationResolver`].
pub struct EntryGeocoder<'r, P> {
    resolver: &'r LocationResolver<P>,
}

impl<'r, P: GeocodingProvider> EntryGeocoder<'r, P> {
    pub fn new(resolver: &'r LocationResolver<P>) -> Self {
        Self { resolver }
    }

    /// Prepare a brand-new entry: geocode unless it already carries
    /// coordinates (e.g. the user dropped a pin on the map).
    pub fn prepare_new(&self, entry: &mut Entry) -> Result<(), EntryError> {
        entry.validate()?;
        if entry.coordinates().is_some() {
            debug!(title = %entry.title, "entry already has coordinates");
            return Ok(());
        }
        let coords = self
            .resolver
            .resolve(entry.place.as_deref(), entry.country.as_deref())?;
        entry.set_coordinates(coords);
        Ok(())
    }

    /// Prepare an edit of `stored`. Re-geocodes only when place or country
    /// changed; otherwise the stored coordinates carry over.
    pub fn prepare_update(&self, stored: &Entry, update: &mut Entry) -> Result<(), EntryError> {
        update.validate()?;
        if !update.location_changed(stored) {
            if update.coordinates().is_none() {
                if let Some(coords) = stored.coordinates() {
                    update.set_coordinates(coords);
                }
            }
            return Ok(());
        }

        let place = non_blank(update.place.as_deref()).or_else(|| non_blank(stored.place.as_deref()));
        let country = non_blank(update.country.as_deref()).or_else(|| non_blank(stored.country.as_deref()));
        info!(
            place = place.as_deref().unwrap_or("-"),
            country = country.as_deref().unwrap_or("-"),
            "entry location changed, geocoding"
        );
        let coords = self.resolver.resolve(place.as_deref(), country.as_deref())?;
        update.set_coordinates(coords);
        Ok(())
    }
}

// ─── Legacy documents ───────────────────────────────────────────

/// Read coordinates out of a stored document of any vintage.
///
/// Older records use `lat`/`lng` or a nested `location` object, sometimes
/// with the numbers stored as strings.
pub fn legacy_coordinates(doc: &Value) -> Option<Coordinates> {
    let lat = number_field(doc, &["latitude", "lat"])
        .or_else(|| doc.get("location").and_then(|loc| number_field(loc, &["lat", "latitude"])))?;
    let lon = number_field(doc, &["longitude", "lng", "lon"])
        .or_else(|| doc.get("location").and_then(|loc| number_field(loc, &["lng", "longitude", "lon"])))?;
    Coordinates::new(lat, lon)
}

fn number_field(obj: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::testing::{candidate, StubProvider};
    use crate::location::ProviderError;
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn dive(place: &str, country: &str) -> Entry {
        Entry {
            user_id: "user-1".into(),
            title: "Morning dive".into(),
            hobby: "Scuba".into(),
            place: Some(place.into()),
            country: Some(country.into()),
            date: NaiveDate::from_ymd_opt(2024, 5, 12),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate() {
        assert!(dive("Dahab", "Egypt").validate().is_ok());

        let mut e = dive("Dahab", "Egypt");
        e.user_id = " ".into();
        assert_eq!(e.validate(), Err(EntryError::MissingField("userId")));

        let mut e = dive("", "");
        e.place = None;
        assert_eq!(e.validate(), Err(EntryError::MissingField("place or country")));
    }

    #[test]
    fn test_prepare_new_geocodes() {
        let stub = StubProvider::new(|_| Ok(vec![candidate("28.5091", "34.5136", "Egypt", "eg")]));
        let resolver = LocationResolver::with_provider(&stub);
        let mut entry = dive("Dahab", "Egypt");
        EntryGeocoder::new(&resolver).prepare_new(&mut entry).unwrap();
        assert_abs_diff_eq!(entry.latitude.unwrap(), 28.5091);
        assert_abs_diff_eq!(entry.longitude.unwrap(), 34.5136);
    }

    #[test]
    fn test_prepare_new_keeps_pinned_coordinates() {
        let stub = StubProvider::new(|_| panic!("pinned entries are not geocoded"));
        let resolver = LocationResolver::with_provider(&stub);
        let mut entry = dive("Dahab", "Egypt");
        entry.latitude = Some(28.0);
        entry.longitude = Some(34.0);
        EntryGeocoder::new(&resolver).prepare_new(&mut entry).unwrap();
        assert_eq!(entry.latitude, Some(28.0));
    }

    #[test]
    fn test_prepare_new_surfaces_geocoding_failure() {
        let stub = StubProvider::new(|_| Ok(vec![]));
        let resolver = LocationResolver::with_provider(&stub);
        let mut entry = dive("NowhereLand", "Narnia");
        let err = EntryGeocoder::new(&resolver).prepare_new(&mut entry).unwrap_err();
        assert!(matches!(err, EntryError::Geocoding(LocationError::NotFound(_))));
        assert!(err.to_string().starts_with("Geocoding failed"));
        assert!(entry.latitude.is_none());
    }

    #[test]
    fn test_prepare_update_unchanged_location_carries_coordinates() {
        let stub = StubProvider::new(|_| panic!("unchanged location must not be geocoded"));
        let resolver = LocationResolver::with_provider(&stub);
        let mut stored = dive("Dahab", "Egypt");
        stored.latitude = Some(28.5);
        stored.longitude = Some(34.5);

        let mut update = dive(" Dahab ", "Egypt");
        update.title = "Renamed".into();
        EntryGeocoder::new(&resolver).prepare_update(&stored, &mut update).unwrap();
        assert_eq!(update.coordinates(), stored.coordinates());
    }

    #[test]
    fn test_prepare_update_changed_location_regeocodes() {
        let stub = StubProvider::new(|_| Ok(vec![candidate("27.2579", "33.8116", "Egypt", "eg")]));
        let resolver = LocationResolver::with_provider(&stub);
        let mut stored = dive("Dahab", "Egypt");
        stored.latitude = Some(28.5);
        stored.longitude = Some(34.5);

        let mut update = dive("Hurgada", "Egypt");
        update.latitude = stored.latitude;
        update.longitude = stored.longitude;
        EntryGeocoder::new(&resolver).prepare_update(&stored, &mut update).unwrap();
        assert_abs_diff_eq!(update.latitude.unwrap(), 27.2579);
        assert_eq!(stub.search_calls()[0].query, "Hurghada");
    }

    #[test]
    fn test_prepare_update_falls_back_to_stored_fields() {
        let stub = StubProvider::new(|_| Err(ProviderError::Status(500)));
        let resolver = LocationResolver::with_provider(&stub);
        let stored = dive("Dahab", "Egypt");
        let mut update = dive("Dahab", "");
        update.country = None;
        let err = EntryGeocoder::new(&resolver).prepare_update(&stored, &mut update).unwrap_err();
        assert!(matches!(err, EntryError::Geocoding(LocationError::ProviderUnavailable(_))));
        // Country fell back to the stored "Egypt", so the hinted rungs ran.
        assert_eq!(stub.search_calls()[0].country_code.as_deref(), Some("eg"));
    }

    #[test]
    fn test_prepare_update_rejects_invalid_entry() {
        let stub = StubProvider::new(|_| panic!("invalid updates are not geocoded"));
        let resolver = LocationResolver::with_provider(&stub);
        let stored = dive("Dahab", "Egypt");

        let mut update = dive("Hurghada", "Egypt");
        update.user_id = String::new();
        let err = EntryGeocoder::new(&resolver).prepare_update(&stored, &mut update).unwrap_err();
        assert_eq!(err, EntryError::MissingField("userId"));

        let mut update = dive("Hurghada", "Egypt");
        update.title = "  ".into();
        let err = EntryGeocoder::new(&resolver).prepare_update(&stored, &mut update).unwrap_err();
        assert_eq!(err, EntryError::MissingField("title"));
        assert!(update.latitude.is_none());
    }

    #[test]
    fn test_entry_json_shape() {
        let mut entry = dive("Dahab", "Egypt");
        entry.latitude = Some(28.5);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["userId"], "user-1");
        assert_eq!(value["date"], "2024-05-12");
        assert!(value.get("id").is_none());

        let back: Entry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_legacy_coordinates_variants() {
        let modern = json!({"latitude": 28.5, "longitude": 34.5});
        let short = json!({"lat": "28.5", "lng": "34.5"});
        let nested = json!({"location": {"lat": 28.5, "lng": "34.5"}});
        for doc in [modern, short, nested] {
            let c = legacy_coordinates(&doc).unwrap();
            assert_abs_diff_eq!(c.latitude, 28.5);
            assert_abs_diff_eq!(c.longitude, 34.5);
        }
    }

    #[test]
    fn test_legacy_coordinates_missing_or_bad() {
        assert!(legacy_coordinates(&json!({"title": "no coords"})).is_none());
        assert!(legacy_coordinates(&json!({"lat": "abc", "lng": 1.0})).is_none());
        assert!(legacy_coordinates(&json!({"latitude": 95.0, "longitude": 1.0})).is_none());
        assert!(legacy_coordinates(&json!({"latitude": null, "lat": 10.0, "lng": 20.0})).is_some());
    }
}
