use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use super::types::{ForecastSnapshot, WeatherSnapshot};
use crate::config::Config;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
}

/// Status plus the decoded body of a single API call.
///
/// `body` is only ever populated for 2xx responses that carried content.
#[derive(Debug, Clone)]
pub struct RawResponse<T> {
    pub status: u16,
    pub body: Option<T>,
}

impl<T> RawResponse<T> {
    pub fn new(status: u16, body: Option<T>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body of a successful response, `None` otherwise.
    pub fn into_success_body(self) -> Option<T> {
        if self.is_success() {
            self.body
        } else {
            None
        }
    }
}

/// Read-only access to the remote weather API. One attempt per call.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_current(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<RawResponse<WeatherSnapshot>, ClientError>;

    async fn fetch_forecast(
        &self,
        api_key: &str,
        query: &str,
        days: u8,
        include_alerts: bool,
    ) -> Result<RawResponse<ForecastSnapshot>, ClientError>;
}

pub struct WeatherApiClient {
    client: Client,
    base_url: String,
}

impl WeatherApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("weather-lookup-server/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(
            &config.weather_api_base_url,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<RawResponse<T>, ClientError> {
        let url = format!("{}/{}", self.base_url, path);

        // The api key travels in the query string, keep it out of error text.
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Weather API returned {} for {}", status, path);
            return Ok(RawResponse::new(status.as_u16(), None));
        }

        let text = response.text().await.map_err(|e| e.without_url())?;
        if text.trim().is_empty() {
            tracing::warn!("Weather API returned an empty body for {}", path);
            return Ok(RawResponse::new(status.as_u16(), None));
        }

        let body = serde_json::from_str(&text)?;
        Ok(RawResponse::new(status.as_u16(), Some(body)))
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn fetch_current(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<RawResponse<WeatherSnapshot>, ClientError> {
        tracing::debug!("Requesting current conditions for {}", query);
        self.get_json("current.json", &[("key", api_key), ("q", query), ("aqi", "no")])
            .await
    }

    async fn fetch_forecast(
        &self,
        api_key: &str,
        query: &str,
        days: u8,
        include_alerts: bool,
    ) -> Result<RawResponse<ForecastSnapshot>, ClientError> {
        tracing::debug!("Requesting {}-day forecast for {}", days, query);
        let days = days.to_string();
        let alerts = if include_alerts { "yes" } else { "no" };
        self.get_json(
            "forecast.json",
            &[
                ("key", api_key),
                ("q", query),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", alerts),
            ],
        )
        .await
    }
}
