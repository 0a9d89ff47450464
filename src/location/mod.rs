//! Location subsystem for HobbyMap.
//!
//! Turns a user-typed place/country into map coordinates through an ordered
//! ladder of Nominatim queries, and map points back into place labels.

pub mod providers;
pub mod resolver;
pub mod tables;
pub mod types;

pub use providers::{GeocodingProvider, NominatimProvider, SearchRequest};
pub use resolver::LocationResolver;
pub use tables::{country_alias_list, country_hint, normalize_place, CountryAlias};
pub use types::{Coordinates, LocationError, LocationQuery, ProviderError, ReverseResult};
