//! Client Module
//!
//! The public face of the crate: a coalescing, cache-first client, its
//! builder, and the registry of live clients.

mod builder;
mod caching;
mod inflight;
mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::{ClientBuilder, DEFAULT_SHUTDOWN_GRACE};
pub use caching::CachingClient;
pub use inflight::{InFlightGuard, InFlightTable};
pub use registry::{mask_credential, ClientRegistry};

use crate::models::WeatherData;

/// Client serving OpenWeather readings keyed by city.
pub type WeatherClient = CachingClient<WeatherData>;
