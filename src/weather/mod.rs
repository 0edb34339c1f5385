pub mod client;
pub mod types;

pub use client::{ClientError, RawResponse, WeatherApiClient, WeatherSource};
pub use types::{ForecastSnapshot, WeatherSnapshot};
