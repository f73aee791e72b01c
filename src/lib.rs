//! Weather Cache - A caching client for rate-limited weather providers
//!
//! Fronts an upstream fetcher with a TTL + LRU cache, coalesces concurrent
//! misses per key, and optionally refreshes cached keys in the background.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod tasks;

pub use client::{CachingClient, ClientBuilder, ClientRegistry, WeatherClient};
pub use config::{ApiConfig, SdkConfig, WorkMode};
pub use error::{ClientError, FetchError, Result};
pub use fetcher::{Fetcher, OpenWeatherFetcher};
pub use models::WeatherData;
