//! Weather value type served by the client
//!
//! `WeatherData` is what the cache stores and what callers receive. It is
//! built from the provider payload and serializes to pretty JSON for display.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::models::openweather::CurrentWeatherResponse;

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub weather: Weather,
    pub temperature: Temperature,
    pub visibility: Option<u32>,
    pub wind: Wind,
    /// Observation time
    pub datetime: DateTime<Utc>,
    pub sys: Sys,
    /// Shift from UTC in seconds
    pub timezone: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub temp: f64,
    pub feels_like: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl TryFrom<CurrentWeatherResponse> for WeatherData {
    type Error = FetchError;

    fn try_from(body: CurrentWeatherResponse) -> Result<Self, Self::Error> {
        let condition = body
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::new("Malformed payload: empty 'weather' array"))?;

        Ok(Self {
            weather: Weather {
                main: condition.main,
                description: condition.description,
            },
            temperature: Temperature {
                temp: body.main.temp,
                feels_like: body.main.feels_like,
            },
            visibility: body.visibility,
            wind: Wind {
                speed: body.wind.speed,
            },
            datetime: unix_seconds(body.dt, "dt")?,
            sys: Sys {
                sunrise: unix_seconds(body.sys.sunrise, "sys.sunrise")?,
                sunset: unix_seconds(body.sys.sunset, "sys.sunset")?,
            },
            timezone: body.timezone,
            name: body.name,
        })
    }
}

fn unix_seconds(secs: i64, field: &str) -> Result<DateTime<Utc>, FetchError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| FetchError::new(format!("Malformed payload: '{}' out of range", field)))
}
