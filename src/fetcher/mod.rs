//! Fetcher Module
//!
//! The upstream seam of the client. A fetcher retrieves fresh data for one
//! key; it never caches and never retries.

mod openweather;

use async_trait::async_trait;

pub use crate::error::FetchError;
pub use openweather::OpenWeatherFetcher;

/// Retrieves fresh data for a key from the upstream provider.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Value produced for each key.
    type Value: Clone + Send + Sync + 'static;

    /// Fetches the current value for `key`.
    ///
    /// Any transport, status or payload failure is reported as a single
    /// [`FetchError`].
    async fn fetch(&self, key: &str) -> Result<Self::Value, FetchError>;
}
