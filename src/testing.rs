//! Fixtures and a scripted weather source shared by the unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::weather::client::{ClientError, RawResponse, WeatherSource};
use crate::weather::types::{ForecastSnapshot, WeatherSnapshot};

pub const LONDON_CURRENT_JSON: &str = r#"{
    "location": {
        "name": "London",
        "region": "City of London, Greater London",
        "country": "United Kingdom",
        "lat": 51.52,
        "lon": -0.11,
        "tz_id": "Europe/London",
        "localtime_epoch": 1792144800,
        "localtime": "2026-10-16 10:00"
    },
    "current": {
        "last_updated_epoch": 1792144500,
        "last_updated": "2026-10-16 09:55",
        "temp_c": 14.2,
        "temp_f": 57.6,
        "is_day": 1,
        "condition": {
            "text": "Partly cloudy",
            "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png",
            "code": 1003
        },
        "wind_mph": 9.4,
        "wind_kph": 15.1,
        "wind_degree": 240,
        "wind_dir": "WSW",
        "pressure_mb": 1012.0,
        "pressure_in": 29.88,
        "precip_mm": 0.0,
        "precip_in": 0.0,
        "humidity": 77,
        "cloud": 50,
        "feelslike_c": 13.1,
        "feelslike_f": 55.6,
        "vis_km": 10.0,
        "vis_miles": 6.0,
        "uv": 3.0,
        "gust_mph": 12.8,
        "gust_kph": 20.6
    }
}"#;

pub const FORECAST_JSON: &str = r#"{
    "location": {
        "name": "London",
        "region": "City of London, Greater London",
        "country": "United Kingdom",
        "lat": 51.52,
        "lon": -0.11,
        "tz_id": "Europe/London",
        "localtime_epoch": 1792144800,
        "localtime": "2026-10-16 10:00"
    },
    "current": {
        "temp_c": 14.2,
        "temp_f": 57.6,
        "condition": {"text": "Partly cloudy", "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png", "code": 1003},
        "wind_mph": 9.4,
        "wind_kph": 15.1,
        "pressure_mb": 1012.0,
        "humidity": 77,
        "feelslike_c": 13.1,
        "vis_km": 10.0
    },
    "forecast": {
        "forecastday": [
            {
                "date": "2026-10-16",
                "date_epoch": 1792108800,
                "day": {
                    "maxtemp_c": 16.1, "maxtemp_f": 61.0,
                    "mintemp_c": 9.4, "mintemp_f": 48.9,
                    "avgtemp_c": 12.8, "avgtemp_f": 55.0,
                    "maxwind_mph": 13.6, "maxwind_kph": 22.0,
                    "totalprecip_mm": 4.2, "totalprecip_in": 0.17,
                    "totalsnow_cm": 0.0,
                    "avgvis_km": 9.4, "avgvis_miles": 5.0,
                    "avghumidity": 81,
                    "daily_will_it_rain": 1, "daily_chance_of_rain": 80,
                    "daily_will_it_snow": 0, "daily_chance_of_snow": 0,
                    "condition": {"text": "Patchy rain nearby", "icon": "//cdn.weatherapi.com/weather/64x64/day/176.png", "code": 1063},
                    "uv": 2.0
                },
                "astro": {
                    "sunrise": "07:28 AM", "sunset": "06:07 PM",
                    "moonrise": "05:41 PM", "moonset": "08:12 AM",
                    "moon_phase": "Waxing Gibbous", "moon_illumination": 91,
                    "is_moon_up": 0, "is_sun_up": 1
                },
                "hour": [
                    {
                        "time_epoch": 1792108800, "time": "2026-10-16 00:00",
                        "temp_c": 10.3, "temp_f": 50.5, "is_day": 0,
                        "condition": {"text": "Clear", "icon": "//cdn.weatherapi.com/weather/64x64/night/113.png", "code": 1000},
                        "wind_kph": 11.2, "humidity": 88, "chance_of_rain": 0
                    },
                    {
                        "time_epoch": 1792112400, "time": "2026-10-16 01:00",
                        "temp_c": 10.0, "temp_f": 50.0, "is_day": 0,
                        "condition": {"text": "Clear", "icon": "//cdn.weatherapi.com/weather/64x64/night/113.png", "code": 1000},
                        "wind_kph": 10.8, "humidity": 89, "chance_of_rain": 0
                    }
                ]
            },
            {
                "date": "2026-10-17",
                "date_epoch": 1792195200,
                "day": {
                    "maxtemp_c": 15.0, "maxtemp_f": 59.0,
                    "mintemp_c": 8.9, "mintemp_f": 48.0,
                    "avgtemp_c": 11.9, "avgtemp_f": 53.4,
                    "maxwind_mph": 10.1, "maxwind_kph": 16.2,
                    "totalprecip_mm": 0.0,
                    "avghumidity": 75,
                    "condition": {"text": "Sunny", "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png", "code": 1000}
                },
                "astro": {"sunrise": "07:30 AM", "sunset": "06:05 PM"},
                "hour": []
            }
        ]
    }
}"#;

pub fn london_snapshot() -> WeatherSnapshot {
    serde_json::from_str(LONDON_CURRENT_JSON).expect("fixture parses")
}

pub fn snapshot_with_temp(temp_c: f64) -> WeatherSnapshot {
    let mut snapshot = london_snapshot();
    snapshot.current.temp_c = temp_c;
    snapshot
}

pub fn sample_forecast() -> ForecastSnapshot {
    serde_json::from_str(FORECAST_JSON).expect("fixture parses")
}

fn malformed_body() -> ClientError {
    let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    ClientError::JsonParsing(err)
}

#[derive(Debug, Clone)]
pub enum Reply<T> {
    Body(T),
    Status(u16),
    /// 2xx without a body.
    Empty,
    Malformed,
}

impl<T: Clone> Reply<T> {
    fn to_response(&self) -> Result<RawResponse<T>, ClientError> {
        match self {
            Reply::Body(body) => Ok(RawResponse::new(200, Some(body.clone()))),
            Reply::Status(status) => Ok(RawResponse::new(*status, None)),
            Reply::Empty => Ok(RawResponse::new(200, None)),
            Reply::Malformed => Err(malformed_body()),
        }
    }
}

/// Answers every call with the currently scripted reply and counts calls.
pub struct FakeWeatherSource {
    current: Mutex<Reply<WeatherSnapshot>>,
    forecast: Mutex<Reply<ForecastSnapshot>>,
    delay: Option<Duration>,
    current_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
    last_forecast_args: Mutex<Option<(String, u8, bool)>>,
}

impl FakeWeatherSource {
    pub fn new(current: Reply<WeatherSnapshot>) -> Self {
        Self {
            current: Mutex::new(current),
            forecast: Mutex::new(Reply::Body(sample_forecast())),
            delay: None,
            current_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
            last_forecast_args: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_current(&self, reply: Reply<WeatherSnapshot>) {
        *self.current.lock().unwrap() = reply;
    }

    pub fn set_forecast(&self, reply: Reply<ForecastSnapshot>) {
        *self.forecast.lock().unwrap() = reply;
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    pub fn last_forecast_args(&self) -> Option<(String, u8, bool)> {
        self.last_forecast_args.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherSource for FakeWeatherSource {
    async fn fetch_current(
        &self,
        _api_key: &str,
        _query: &str,
    ) -> Result<RawResponse<WeatherSnapshot>, ClientError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.current.lock().unwrap().clone();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        reply.to_response()
    }

    async fn fetch_forecast(
        &self,
        _api_key: &str,
        query: &str,
        days: u8,
        include_alerts: bool,
    ) -> Result<RawResponse<ForecastSnapshot>, ClientError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_forecast_args.lock().unwrap() = Some((query.to_string(), days, include_alerts));
        let reply = self.forecast.lock().unwrap().clone();
        reply.to_response()
    }
}
