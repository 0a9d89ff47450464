use crate::config::GeocoderConfig;
use crate::location::{GeocodingProvider, LocationResolver, NominatimProvider};

/// Shared by every request. The resolver is stateless, so no lock.
pub struct AppState {
    pub resolver: LocationResolver<Box<dyn GeocodingProvider>>,
}

impl AppState {
    pub fn new(config: &GeocoderConfig) -> Self {
        Self::with_provider(Box::new(NominatimProvider::new(config)))
    }

    pub fn with_provider(provider: Box<dyn GeocodingProvider>) -> Self {
        Self {
            resolver: LocationResolver::with_provider(provider),
        }
    }
}
