//! JSON API used by the HobbyMap frontend for geocoding.

mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::GeocoderConfig;

pub use handlers::{ApiError, ApiErrorBody};
pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/resolve", get(handlers::resolve))
        .route("/api/reverse", get(handlers::reverse))
        .route("/api/countries", get(handlers::countries))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn start(host: &str, port: u16, config: &GeocoderConfig) -> std::io::Result<()> {
    let state = Arc::new(AppState::new(config));
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(geocoder = %config.base_url, "HobbyMap geocoding API listening on http://{addr}");
    axum::serve(listener, app).await
}
