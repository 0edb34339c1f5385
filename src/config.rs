use std::env;
use std::str::FromStr;

pub const DEFAULT_WEATHER_API_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./weather_cache.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_FORECAST_DAYS: u8 = 7;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// WeatherAPI serves at most 14 forecast days.
const MAX_FORECAST_DAYS: u8 = 14;

#[derive(Clone, Debug)]
pub struct Config {
    pub weather_api_key: String,
    pub weather_api_base_url: String,
    pub forecast_days: u8,
    pub forecast_alerts: bool,
    pub http_timeout_secs: u64,
    pub database_url: String,
    pub bind_addr: String,
    /// Zero disables the background expiry sweep.
    pub cache_sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let weather_api_key = lookup("WEATHER_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("WEATHER_API_KEY not set"))?;

        let forecast_days = parse_or(&lookup, "FORECAST_DAYS", DEFAULT_FORECAST_DAYS)?;
        if forecast_days == 0 || forecast_days > MAX_FORECAST_DAYS {
            anyhow::bail!(
                "FORECAST_DAYS must be between 1 and {}, got {}",
                MAX_FORECAST_DAYS,
                forecast_days
            );
        }

        Ok(Config {
            weather_api_key,
            weather_api_base_url: lookup("WEATHER_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_API_BASE_URL.to_string()),
            forecast_days,
            forecast_alerts: parse_or(&lookup, "FORECAST_ALERTS", false)?,
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cache_sweep_interval_secs: parse_or(&lookup, "CACHE_SWEEP_INTERVAL_SECS", 0)?,
        })
    }

    /// An empty `DATABASE_URL` or `memory` keeps the cache in process.
    pub fn uses_memory_cache(&self) -> bool {
        let url = self.database_url.trim();
        url.is_empty() || url.eq_ignore_ascii_case("memory")
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", name, raw, e)),
        None => Ok(default),
    }
}
