use serde::{Deserialize, Serialize};

/// Body of `current.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: Current,
}

/// Body of `forecast.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub location: Location,
    pub current: Current,
    pub forecast: Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tz_id: String,
    #[serde(default)]
    pub localtime_epoch: i64,
    #[serde(default)]
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub last_updated_epoch: i64,
    #[serde(default)]
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    #[serde(default)]
    pub is_day: u8,
    pub condition: Condition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_degree: i32,
    #[serde(default)]
    pub wind_dir: String,
    pub pressure_mb: f64,
    #[serde(default)]
    pub pressure_in: f64,
    #[serde(default)]
    pub precip_mm: f64,
    pub humidity: i32,
    #[serde(default)]
    pub cloud: i32,
    pub feelslike_c: f64,
    #[serde(default)]
    pub feelslike_f: f64,
    pub vis_km: f64,
    #[serde(default)]
    pub vis_miles: f64,
    #[serde(default)]
    pub uv: f64,
    #[serde(default)]
    pub gust_kph: f64,
    #[serde(default)]
    pub gust_mph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    #[serde(default)]
    pub code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(rename = "forecastday")]
    pub forecast_day: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub date_epoch: i64,
    pub day: DaySummary,
    pub astro: Astro,
    #[serde(default)]
    pub hour: Vec<ForecastHour>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    #[serde(rename = "maxtemp_c")]
    pub max_temp_c: f64,
    #[serde(rename = "maxtemp_f")]
    pub max_temp_f: f64,
    #[serde(rename = "mintemp_c")]
    pub min_temp_c: f64,
    #[serde(rename = "mintemp_f")]
    pub min_temp_f: f64,
    #[serde(rename = "avgtemp_c")]
    pub avg_temp_c: f64,
    #[serde(rename = "avgtemp_f")]
    pub avg_temp_f: f64,
    #[serde(rename = "maxwind_mph")]
    pub max_wind_mph: f64,
    #[serde(rename = "maxwind_kph")]
    pub max_wind_kph: f64,
    #[serde(rename = "totalprecip_mm")]
    pub total_precip_mm: f64,
    #[serde(rename = "totalprecip_in", default)]
    pub total_precip_in: f64,
    #[serde(rename = "totalsnow_cm", default)]
    pub total_snow_cm: f64,
    #[serde(rename = "avgvis_km", default)]
    pub avg_vis_km: f64,
    #[serde(rename = "avgvis_miles", default)]
    pub avg_vis_miles: f64,
    #[serde(rename = "avghumidity")]
    pub avg_humidity: f64,
    #[serde(default)]
    pub daily_will_it_rain: u8,
    #[serde(default)]
    pub daily_chance_of_rain: u8,
    #[serde(default)]
    pub daily_will_it_snow: u8,
    #[serde(default)]
    pub daily_chance_of_snow: u8,
    pub condition: Condition,
    #[serde(default)]
    pub uv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
    #[serde(default)]
    pub moonrise: String,
    #[serde(default)]
    pub moonset: String,
    #[serde(default)]
    pub moon_phase: String,
    #[serde(default)]
    pub is_moon_up: u8,
    #[serde(default)]
    pub is_sun_up: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastHour {
    pub time_epoch: i64,
    pub time: String,
    pub temp_c: f64,
    pub temp_f: f64,
    #[serde(default)]
    pub is_day: u8,
    pub condition: Condition,
    #[serde(default)]
    pub wind_mph: f64,
    #[serde(default)]
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_degree: i32,
    #[serde(default)]
    pub wind_dir: String,
    #[serde(default)]
    pub pressure_mb: f64,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub humidity: i32,
    #[serde(default)]
    pub cloud: i32,
    #[serde(default)]
    pub feelslike_c: f64,
    #[serde(default)]
    pub will_it_rain: u8,
    #[serde(default)]
    pub chance_of_rain: u8,
    #[serde(default)]
    pub will_it_snow: u8,
    #[serde(default)]
    pub chance_of_snow: u8,
    #[serde(default)]
    pub vis_km: f64,
    #[serde(default)]
    pub gust_kph: f64,
    #[serde(default)]
    pub uv: f64,
}
