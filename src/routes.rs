use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    location::{LocationError, LocationQuery},
    repository::{CacheStatus, Resource, ResourceStream, WeatherRepository},
    weather::types::{ForecastSnapshot, WeatherSnapshot},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<WeatherRepository>,
}

impl AppState {
    pub fn new(repository: Arc<WeatherRepository>) -> Self {
        Self { repository }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    pub q: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl LocationParams {
    /// Coordinates win over free text when both are given.
    fn to_query(&self) -> Result<LocationQuery, LocationError> {
        match (self.lat, self.lon, self.q.as_deref()) {
            (Some(lat), Some(lon), _) => LocationQuery::from_coordinates(lat, lon),
            (_, _, Some(text)) => LocationQuery::parse(text),
            (Some(_), None, None) => Err(LocationError::MissingLongitude),
            (None, Some(_), None) => Err(LocationError::MissingLatitude),
            (None, None, None) => Err(LocationError::Blank),
        }
    }
}

/// JSON rendering of a `Resource` envelope.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Loading,
    Success { data: T },
    Error { message: String },
}

impl<T> From<Resource<T>> for Envelope<T> {
    fn from(resource: Resource<T>) -> Self {
        match resource {
            Resource::Loading => Envelope::Loading,
            Resource::Success(data) => Envelope::Success { data },
            Resource::Error(failure) => Envelope::Error {
                message: failure.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache_backend: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct CacheListResponse {
    pub entries: Vec<CacheStatus>,
}

#[derive(Debug, Serialize)]
pub struct CacheRemovalResponse {
    pub removed: u64,
}

fn invalid_query(err: LocationError) -> Response {
    let body: Envelope<()> = Envelope::Error {
        message: err.to_string(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn cache_failure(err: crate::cache::CacheError) -> Response {
    tracing::error!("Weather cache operation failed: {}", err);
    let body: Envelope<()> = Envelope::Error {
        message: err.to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Drains an envelope stream and renders its terminal value.
async fn respond_with_terminal<T: Serialize>(mut stream: ResourceStream<T>) -> Response {
    let mut last = Resource::Loading;
    while let Some(resource) = stream.next().await {
        if !resource.is_terminal() {
            tracing::debug!("Request in progress");
        }
        last = resource;
    }

    let status = match &last {
        Resource::Success(_) => StatusCode::OK,
        Resource::Error(_) => StatusCode::BAD_GATEWAY,
        Resource::Loading => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(Envelope::from(last))).into_response()
}

fn sse_events<T>(
    stream: ResourceStream<T>,
) -> impl Stream<Item = Result<Event, axum::Error>> + Send
where
    T: Serialize + Send + 'static,
{
    stream.map(|resource| {
        Event::default()
            .event("weather")
            .json_data(Envelope::from(resource))
    })
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.repository.cache_health().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::error!("Weather cache health check failed: {}", e);
            "degraded"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        cache_backend: state.repository.cache_backend().to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Response {
    match params.to_query() {
        Ok(query) => {
            let stream: ResourceStream<WeatherSnapshot> =
                state.repository.get_current_weather(query.as_str());
            respond_with_terminal(stream).await
        }
        Err(e) => invalid_query(e),
    }
}

pub async fn stream_current_weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Response {
    match params.to_query() {
        Ok(query) => {
            let events = sse_events(state.repository.get_current_weather(query.as_str()));
            Sse::new(events)
                .keep_alive(KeepAlive::default())
                .into_response()
        }
        Err(e) => invalid_query(e),
    }
}

pub async fn refresh_weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Response {
    match params.to_query() {
        Ok(query) => {
            respond_with_terminal(state.repository.refresh_weather_data(query.as_str())).await
        }
        Err(e) => invalid_query(e),
    }
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Response {
    match params.to_query() {
        Ok(query) => {
            let stream: ResourceStream<ForecastSnapshot> =
                state.repository.get_forecast(query.as_str());
            respond_with_terminal(stream).await
        }
        Err(e) => invalid_query(e),
    }
}

pub async fn list_cache(State(state): State<AppState>) -> Response {
    match state.repository.cache_status().await {
        Ok(entries) => Json(CacheListResponse { entries }).into_response(),
        Err(e) => cache_failure(e),
    }
}

pub async fn clear_cache(State(state): State<AppState>) -> Response {
    match state.repository.clear_cache().await {
        Ok(removed) => Json(CacheRemovalResponse { removed }).into_response(),
        Err(e) => cache_failure(e),
    }
}

pub async fn sweep_cache(State(state): State<AppState>) -> Response {
    match state.repository.sweep_expired().await {
        Ok(removed) => Json(CacheRemovalResponse { removed }).into_response(),
        Err(e) => cache_failure(e),
    }
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weather/current", get(get_current_weather))
        .route("/weather/current/stream", get(stream_current_weather))
        .route("/weather/refresh", post(refresh_weather))
        .route("/forecast", get(get_forecast))
        .route("/cache", get(list_cache).delete(clear_cache))
        .route("/cache/sweep", post(sweep_cache))
        .with_state(state)
}
