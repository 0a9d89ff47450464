//! HobbyMap location services.
//!
//! Resolves the place/country typed into an activity entry into map
//! coordinates, and map clicks back into place labels, using an
//! OpenStreetMap Nominatim instance.
//!
//! ```no_run
//! use hobbymap::config::GeocoderConfig;
//! use hobbymap::location::LocationResolver;
//!
//! let resolver = LocationResolver::new(&GeocoderConfig::default());
//! let coords = resolver.resolve(Some("Dahab"), Some("Egypt"))?;
//! println!("{coords}");
//! # Ok::<(), hobbymap::location::LocationError>(())
//! ```

pub mod config;
pub mod entry;
pub mod location;
pub mod server;

use tracing_subscriber::EnvFilter;

/// Install the stderr `tracing` subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
