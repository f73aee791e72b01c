//! OpenWeather wire DTOs
//!
//! Mirrors the subset of the "current weather" JSON payload the client reads.
//! Unknown fields are ignored.

use serde::Deserialize;

/// Top-level body of `GET /data/2.5/weather`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeatherResponse {
    pub weather: Vec<WeatherCondition>,
    pub main: MainReadings,
    /// Visibility in metres; omitted by the provider in some regions
    #[serde(default)]
    pub visibility: Option<u32>,
    pub wind: WindReadings,
    /// Observation time, Unix seconds UTC
    pub dt: i64,
    pub sys: SunTimes,
    /// Shift from UTC in seconds
    pub timezone: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherCondition {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindReadings {
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SunTimes {
    pub sunrise: i64,
    pub sunset: i64,
}
