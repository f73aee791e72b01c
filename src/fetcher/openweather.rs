//! OpenWeather HTTP fetcher
//!
//! Calls the "current weather" endpoint with reqwest and maps the JSON body
//! to [`WeatherData`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, trace};

use crate::client::mask_credential;
use crate::config::ApiConfig;
use crate::error::{ClientError, FetchError, Result};
use crate::fetcher::Fetcher;
use crate::models::{CurrentWeatherResponse, WeatherData};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// == OpenWeather Fetcher ==
/// Fetches current weather for a city from OpenWeather.
#[derive(Debug, Clone)]
pub struct OpenWeatherFetcher {
    http: Client,
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
}

impl OpenWeatherFetcher {
    /// Builds a fetcher from provider settings.
    ///
    /// Fails with a configuration error when the API key is missing or still
    /// the placeholder, so no request is ever sent without a credential.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let api_key = config.usable_api_key().ok_or_else(|| {
            ClientError::Configuration(
                "Missing or invalid API key. Set WEATHER_API_KEY.".to_string(),
            )
        })?;

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Configuration(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: config.base_url.clone(),
            units: config.units.clone(),
            lang: config.lang.clone(),
        })
    }

    /// The credential this fetcher authenticates with.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[async_trait]
impl Fetcher for OpenWeatherFetcher {
    type Value = WeatherData;

    async fn fetch(&self, city: &str) -> std::result::Result<WeatherData, FetchError> {
        info!("Requesting weather for '{}'", city);
        debug!(
            "GET {}?q={}&units={}&lang={} (appid={})",
            self.base_url,
            city,
            self.units,
            self.lang,
            mask_credential(&self.api_key)
        );

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Network error while requesting weather for '{}': {}", city, e);
                FetchError::with_source("Network error while calling OpenWeather API", e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            FetchError::with_source("Failed to read OpenWeather response body", e)
        })?;

        if !status.is_success() {
            return Err(FetchError::new(format!("HTTP error: {} - {}", status, body)));
        }

        trace!("Raw JSON response ({} chars)", body.len());

        let payload: CurrentWeatherResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::with_source("Malformed OpenWeather payload", e))?;
        let data = WeatherData::try_from(payload)?;

        info!("Received weather for '{}'", city);
        Ok(data)
    }
}
