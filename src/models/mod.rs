//! Data models for the weather client
//!
//! `openweather` holds the provider's wire DTOs; `weather` holds the value
//! type the cache stores and callers receive.

pub mod openweather;
pub mod weather;

// Re-export commonly used types
pub use openweather::CurrentWeatherResponse;
pub use weather::WeatherData;
