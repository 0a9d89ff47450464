use std::time::Duration;

use clap::{Parser, Subcommand};
use hobbymap::config::GeocoderConfig;
use hobbymap::location::LocationResolver;
use serde::Serialize;

/// HobbyMap — place/country geocoding for activity entries
///
/// Resolves where an entry happened into map coordinates, or a map point
/// back into place and country labels. JSON goes to stdout, logs to stderr.
///
/// Geocoder settings come from HOBBYMAP_GEOCODER_URL, HOBBYMAP_USER_AGENT and
/// HOBBYMAP_TIMEOUT_SECS; the flags below override them.
///
/// Examples:
///   hobbymap resolve --place "Sharm El Sheik" --country Egypt
///   hobbymap resolve --country Maldives
///   hobbymap reverse --lat 43.7034 --lon 7.2663
///   hobbymap serve --port 3000
#[derive(Parser)]
#[command(name = "hobbymap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Nominatim base URL [default: https://nominatim.openstreetmap.org].
    #[arg(long, global = true)]
    geocoder_url: Option<String>,

    /// User-Agent sent to the geocoder (required by Nominatim's usage policy).
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds [default: 10].
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Place and/or country → coordinates.
    Resolve {
        /// Place, e.g. "Dahab" or "Blue Hole".
        #[arg(long)]
        place: Option<String>,

        /// Country as free text, e.g. "Egypt".
        #[arg(long)]
        country: Option<String>,
    },

    /// Coordinates → place / country labels. Always succeeds.
    Reverse {
        /// Latitude (-90 to 90).
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude (-180 to 180).
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Run the HTTP JSON API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

impl Cli {
    /// Environment first, then any flags given on the command line.
    fn geocoder_config(&self) -> GeocoderConfig {
        let env = GeocoderConfig::from_env();
        GeocoderConfig::new(
            self.geocoder_url.clone().unwrap_or(env.base_url),
            self.user_agent.clone().unwrap_or(env.user_agent),
            self.timeout_secs.map_or(env.timeout, Duration::from_secs),
        )
    }
}

fn main() {
    let cli = Cli::parse();
    let default_level = match cli.command {
        Command::Serve { .. } if cli.log_level == "warn" => "info".to_string(),
        _ => cli.log_level.clone(),
    };
    hobbymap::init_logging(&default_level);

    let geocoder = cli.geocoder_config();

    match &cli.command {
        Command::Resolve { place, country } => {
            let resolver = LocationResolver::new(&geocoder);
            match resolver.resolve(place.as_deref(), country.as_deref()) {
                Ok(coords) => print_json(&coords),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Reverse { lat, lon } => {
            let resolver = LocationResolver::new(&geocoder);
            print_json(&resolver.reverse_resolve(*lat, *lon));
        }
        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
                eprintln!("Error: Cannot start runtime: {}", e);
                std::process::exit(1);
            });
            if let Err(e) = runtime.block_on(hobbymap::server::start(host, *port, &geocoder)) {
                eprintln!("Error: Server stopped: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: Cannot encode output: {}", e);
            std::process::exit(1);
        }
    }
}
