//! Cache-coherent access to current conditions and forecasts.
//!
//! `get_current_weather` serves a fresh cache entry when there is one,
//! otherwise fetches and refreshes the cache, and when the fetch fails falls
//! back to whatever (stale) entry is still stored. Every request yields
//! `Resource::Loading` followed by exactly one terminal envelope.

use async_stream::stream;
use futures::Stream;
use moka::future::Cache;
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::cache::{CacheEntry, CacheError, CacheStore};
use crate::clock::Clock;
use crate::config::{Config, DEFAULT_FORECAST_DAYS};
use crate::location::normalize_location_key;
use crate::weather::client::{ClientError, WeatherSource};
use crate::weather::types::{ForecastSnapshot, WeatherSnapshot};

/// Idle per-location locks are dropped after this long.
const LOCK_IDLE_SECS: u64 = 10 * 60;
const MAX_LOCATION_LOCKS: u64 = 10_000;

/// State of one request as seen by a consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error(FetchFailure),
}

impl<T> Resource<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Resource::Loading)
    }
}

impl<T> From<Result<T, FetchFailure>> for Resource<T> {
    fn from(result: Result<T, FetchFailure>) -> Self {
        match result {
            Ok(value) => Resource::Success(value),
            Err(failure) => Resource::Error(failure),
        }
    }
}

pub type ResourceStream<T> = Pin<Box<dyn Stream<Item = Resource<T>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CurrentWeather,
    Refresh,
    Forecast,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Operation::CurrentWeather => "Failed to fetch weather data",
            Operation::Refresh => "Failed to refresh weather data",
            Operation::Forecast => "Failed to fetch forecast data",
        }
    }

    fn network_prefix(self) -> &'static str {
        match self {
            Operation::CurrentWeather | Operation::Refresh => "Network error",
            Operation::Forecast => "Network error while fetching forecast",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CurrentWeather => "current_weather",
            Operation::Refresh => "refresh_weather",
            Operation::Forecast => "forecast",
        };
        f.write_str(name)
    }
}

/// Why a request could not produce a payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The API answered with a non-success status, or a success without a body.
    #[error("{}. Response code: {}", .operation.failure_message(), .status)]
    Http { operation: Operation, status: u16 },
    /// Transport, timeout or body decoding failure.
    #[error("{}: {}", .operation.network_prefix(), .message)]
    Network { operation: Operation, message: String },
}

impl FetchFailure {
    fn network(operation: Operation, err: &ClientError) -> Self {
        FetchFailure::Network {
            operation,
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchFailure::Http { status, .. } => Some(*status),
            FetchFailure::Network { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub api_key: String,
    pub forecast_days: u8,
    pub forecast_alerts: bool,
}

impl RepositoryConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            forecast_alerts: false,
        }
    }
}

impl From<&Config> for RepositoryConfig {
    fn from(config: &Config) -> Self {
        Self {
            api_key: config.weather_api_key.clone(),
            forecast_days: config.forecast_days,
            forecast_alerts: config.forecast_alerts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub location_key: String,
    pub fetched_at_millis: i64,
    pub expires_at_millis: i64,
    pub fresh: bool,
}

struct CachedSnapshot {
    entry: CacheEntry,
    snapshot: WeatherSnapshot,
}

pub struct WeatherRepository {
    source: Arc<dyn WeatherSource>,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    config: RepositoryConfig,
    // Serializes the read-fetch-write sequence per location key.
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl WeatherRepository {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        cache: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        config: RepositoryConfig,
    ) -> Self {
        let locks = Cache::builder()
            .max_capacity(MAX_LOCATION_LOCKS)
            .time_to_idle(Duration::from_secs(LOCK_IDLE_SECS))
            .build();

        Self {
            source,
            cache,
            clock,
            config,
            locks,
        }
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.name()
    }

    /// Loading, then the result of [`WeatherRepository::current_weather`].
    pub fn get_current_weather(
        self: &Arc<Self>,
        query: impl Into<String>,
    ) -> ResourceStream<WeatherSnapshot> {
        let repository = Arc::clone(self);
        let query = query.into();
        Box::pin(stream! {
            yield Resource::Loading;
            yield Resource::from(repository.current_weather(&query).await);
        })
    }

    /// Loading, then the result of [`WeatherRepository::refresh_weather`].
    pub fn refresh_weather_data(
        self: &Arc<Self>,
        query: impl Into<String>,
    ) -> ResourceStream<WeatherSnapshot> {
        let repository = Arc::clone(self);
        let query = query.into();
        Box::pin(stream! {
            yield Resource::Loading;
            yield Resource::from(repository.refresh_weather(&query).await);
        })
    }

    /// Loading, then the result of [`WeatherRepository::forecast`].
    pub fn get_forecast(
        self: &Arc<Self>,
        query: impl Into<String>,
    ) -> ResourceStream<ForecastSnapshot> {
        let repository = Arc::clone(self);
        let query = query.into();
        Box::pin(stream! {
            yield Resource::Loading;
            yield Resource::from(repository.forecast(&query).await);
        })
    }

    /// Fresh cache, else network (refreshing the cache), else stale cache.
    pub async fn current_weather(&self, query: &str) -> Result<WeatherSnapshot, FetchFailure> {
        let location_key = normalize_location_key(query);
        let span = request_span(Operation::CurrentWeather, &location_key);
        self.resolve_current(query, &location_key)
            .instrument(span)
            .await
    }

    /// Always goes to the network. Failures are not masked by the cache.
    pub async fn refresh_weather(&self, query: &str) -> Result<WeatherSnapshot, FetchFailure> {
        let location_key = normalize_location_key(query);
        let span = request_span(Operation::Refresh, &location_key);
        async {
            let lock = self.lock_for(&location_key).await;
            let _guard = lock.lock().await;

            let result = self
                .fetch_and_store(query, &location_key, Operation::Refresh)
                .await;
            if let Err(failure) = &result {
                error!("{}", failure);
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Always live, never cached.
    pub async fn forecast(&self, query: &str) -> Result<ForecastSnapshot, FetchFailure> {
        let location_key = normalize_location_key(query);
        let span = request_span(Operation::Forecast, &location_key);
        async {
            let operation = Operation::Forecast;
            debug!("Fetching forecast for {}", query);

            let response = self
                .source
                .fetch_forecast(
                    &self.config.api_key,
                    query,
                    self.config.forecast_days,
                    self.config.forecast_alerts,
                )
                .await
                .map_err(|e| FetchFailure::network(operation, &e));

            let result = response.and_then(|response| {
                let status = response.status;
                response
                    .into_success_body()
                    .ok_or(FetchFailure::Http { operation, status })
            });

            match &result {
                Ok(_) => debug!("Forecast fetch successful"),
                Err(failure) => error!("{}", failure),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Deletes entries whose expiry has passed at the clock's current time.
    pub async fn sweep_expired(&self) -> Result<u64, CacheError> {
        let now = self.clock.now_millis();
        let removed = self.cache.delete_expired(now).await?;
        if removed > 0 {
            info!("Swept {} expired weather cache entries", removed);
        }
        Ok(removed)
    }

    pub async fn clear_cache(&self) -> Result<u64, CacheError> {
        let removed = self.cache.clear().await?;
        info!("Cleared {} weather cache entries", removed);
        Ok(removed)
    }

    pub async fn cache_status(&self) -> Result<Vec<CacheStatus>, CacheError> {
        let now = self.clock.now_millis();
        let entries = self.cache.list_all().await?;
        Ok(entries
            .into_iter()
            .map(|entry| CacheStatus {
                fresh: entry.is_fresh(now),
                location_key: entry.location_key,
                fetched_at_millis: entry.fetched_at_millis,
                expires_at_millis: entry.expires_at_millis,
            })
            .collect())
    }

    pub async fn cache_health(&self) -> Result<(), CacheError> {
        self.cache.health_check().await
    }

    async fn resolve_current(
        &self,
        query: &str,
        location_key: &str,
    ) -> Result<WeatherSnapshot, FetchFailure> {
        let lock = self.lock_for(location_key).await;
        let _guard = lock.lock().await;

        let now = self.clock.now_millis();
        let cached = match self.cached_snapshot(location_key).await {
            Some(cached) if cached.entry.is_fresh(now) => {
                debug!(
                    "Serving cached weather ({} ms old)",
                    cached.entry.age_millis(now)
                );
                return Ok(cached.snapshot);
            }
            other => other,
        };

        match self
            .fetch_and_store(query, location_key, Operation::CurrentWeather)
            .await
        {
            Ok(snapshot) => Ok(snapshot),
            Err(failure) => match cached {
                Some(stale) => {
                    warn!("{}; using cached data as fallback", failure);
                    Ok(stale.snapshot)
                }
                None => {
                    error!("{}", failure);
                    Err(failure)
                }
            },
        }
    }

    async fn fetch_and_store(
        &self,
        query: &str,
        location_key: &str,
        operation: Operation,
    ) -> Result<WeatherSnapshot, FetchFailure> {
        debug!("Fetching current weather for {}", query);
        let response = self
            .source
            .fetch_current(&self.config.api_key, query)
            .await
            .map_err(|e| FetchFailure::network(operation, &e))?;

        let status = response.status;
        let snapshot = response
            .into_success_body()
            .ok_or(FetchFailure::Http { operation, status })?;

        debug!("Current weather fetch successful");
        self.store(location_key, &snapshot).await;
        Ok(snapshot)
    }

    async fn store(&self, location_key: &str, snapshot: &WeatherSnapshot) {
        let payload = match serde_json::to_string(snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not serialize weather for cache: {}", e);
                return;
            }
        };

        let entry = CacheEntry::new(location_key.to_string(), payload, self.clock.now_millis());
        if let Err(e) = self.cache.put(entry).await {
            warn!("Could not write weather cache: {}", e);
        }
    }

    /// Reads and decodes the cached entry. Unreadable entries count as a miss.
    async fn cached_snapshot(&self, location_key: &str) -> Option<CachedSnapshot> {
        let entry = match self.cache.get(location_key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!("Weather cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<WeatherSnapshot>(&entry.payload) {
            Ok(snapshot) => Some(CachedSnapshot { entry, snapshot }),
            Err(e) => {
                warn!("Discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    async fn lock_for(&self, location_key: &str) -> Arc<Mutex<()>> {
        self.locks
            .get_with(location_key.to_string(), async { Arc::new(Mutex::new(())) })
            .await
    }
}

fn request_span(operation: Operation, location_key: &str) -> Span {
    info_span!(
        "weather_request",
        %operation,
        request_id = %Uuid::new_v4(),
        location_key
    )
}

/// Periodically deletes expired cache rows until the handle is aborted.
pub fn spawn_cache_sweeper(repository: Arc<WeatherRepository>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(e) = repository.sweep_expired().await {
                warn!("Weather cache sweep failed: {}", e);
            }
        }
    })
}
