use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::location::{country_alias_list, Coordinates, CountryAlias, LocationError, LocationQuery, ReverseResult};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiErrorBody {
    pub error: String,
    pub code: u16,
}

#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<LocationError> for ApiError {
    fn from(err: LocationError) -> Self {
        let status = match err {
            LocationError::InvalidInput => StatusCode::BAD_REQUEST,
            LocationError::NotFound(_) => StatusCode::NOT_FOUND,
            LocationError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self(status, err.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(rejection.status(), rejection.body_text())
    }
}

fn task_failed(err: tokio::task::JoinError) -> ApiError {
    error!("resolver task failed: {err}");
    ApiError(StatusCode::INTERNAL_SERVER_ERROR, "Resolver task failed".into())
}

// ─── GET /api/resolve ────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
pub struct ResolveParams {
    pub place: Option<String>,
    pub country: Option<String>,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ResolveParams>, QueryRejection>,
) -> Result<Json<Coordinates>, ApiError> {
    let start = Instant::now();
    let Query(params) = params?;
    let query = LocationQuery::new(params.place.as_deref(), params.country.as_deref());
    if query.is_empty() {
        return Err(LocationError::InvalidInput.into());
    }

    // ureq blocks; keep it off the async workers.
    let worker_query = query.clone();
    let result = tokio::task::spawn_blocking(move || state.resolver.resolve_query(&worker_query))
        .await
        .map_err(task_failed)?;

    info!(
        place = query.place.as_deref().unwrap_or("-"),
        country = query.country.as_deref().unwrap_or("-"),
        ok = result.is_ok(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/resolve"
    );

    Ok(Json(result?))
}

// ─── GET /api/reverse ────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct ReverseParams {
    pub lat: f64,
    pub lon: f64,
}

pub async fn reverse(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ReverseParams>, QueryRejection>,
) -> Result<Json<ReverseResult>, ApiError> {
    let start = Instant::now();
    let Query(ReverseParams { lat, lon }) = params?;
    let result = tokio::task::spawn_blocking(move || state.resolver.reverse_resolve(lat, lon))
        .await
        .map_err(task_failed)?;

    info!(
        lat,
        lon,
        place = %result.place,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/reverse"
    );

    Ok(Json(result))
}

// ─── GET /api/countries ──────────────────────────────────────────

pub async fn countries() -> Json<Vec<CountryAlias>> {
    Json(country_alias_list())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::providers::{Address, ReversePlace};
    use crate::location::testing::{candidate, StubProvider};
    use crate::location::ProviderError;

    fn state_with(stub: StubProvider) -> Arc<AppState> {
        Arc::new(AppState::with_provider(Box::new(stub)))
    }

    fn params(place: Option<&str>, country: Option<&str>) -> Result<Query<ResolveParams>, QueryRejection> {
        Ok(Query(ResolveParams {
            place: place.map(str::to_string),
            country: country.map(str::to_string),
        }))
    }

    fn reverse_query(uri: &str) -> Result<Query<ReverseParams>, QueryRejection> {
        Query::try_from_uri(&uri.parse::<axum::http::Uri>().unwrap())
    }

    #[tokio::test]
    async fn test_resolve_ok() {
        let state = state_with(StubProvider::new(|_| Ok(vec![candidate("48.8566", "2.3522", "France", "fr")])));
        let Json(coords) = resolve(State(state), params(Some("Paris"), Some("France")))
            .await
            .unwrap();
        assert_eq!(coords.latitude, 48.8566);
        assert_eq!(coords.longitude, 2.3522);
    }

    #[tokio::test]
    async fn test_resolve_status_codes() {
        let state = state_with(StubProvider::new(|_| Ok(vec![])));
        let err = resolve(State(state.clone()), params(None, Some("  ")))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let err = resolve(State(state), params(Some("Nowhereville"), Some("Narnia")))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let down = state_with(StubProvider::new(|_| Err(ProviderError::Network("refused".into()))));
        let err = resolve(State(down), params(Some("Paris"), None)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_reverse_always_ok() {
        let state = state_with(StubProvider::new(|_| Ok(vec![])));
        let Json(result) = reverse(State(state), reverse_query("/api/reverse?lat=999&lon=999"))
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_reverse_labels() {
        let stub = StubProvider::new(|_| Ok(vec![])).with_reverse(|_, _| {
            Ok(ReversePlace {
                display_name: Some("Dahab, South Sinai, Egypt".into()),
                address: Some(Address {
                    town: Some("Dahab".into()),
                    country: Some("Egypt".into()),
                    country_code: Some("eg".into()),
                    ..Default::default()
                }),
                error: None,
            })
        });
        let Json(result) = reverse(State(state_with(stub)), reverse_query("/api/reverse?lat=28.5&lon=34.5"))
            .await
            .unwrap();
        assert_eq!(result.place, "Dahab");
        assert_eq!(result.country_code, "EG");
    }

    #[tokio::test]
    async fn test_reverse_bad_query_is_json_400() {
        let state = state_with(StubProvider::new(|_| Ok(vec![])));
        for uri in ["/api/reverse", "/api/reverse?lat=43.7", "/api/reverse?lat=north&lon=7.2"] {
            let err = reverse(State(state.clone()), reverse_query(uri)).await.unwrap_err();
            assert_eq!(err.0, StatusCode::BAD_REQUEST, "{uri}");

            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: ApiErrorBody = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body.code, 400);
            assert!(body.error.starts_with("Failed to deserialize query string"), "{}", body.error);
        }
    }

    #[tokio::test]
    async fn test_countries_lists_aliases() {
        let Json(list) = countries().await;
        assert!(list.iter().any(|c| c.name == "egypt" && c.code == "EG"));
    }

    #[test]
    fn test_error_body_shape() {
        let err = ApiError::from(LocationError::NotFound("Atlantis".into()));
        assert_eq!(err.0, StatusCode::NOT_FOUND);
        assert_eq!(err.1, "Location not found: 'Atlantis'");
    }
}
