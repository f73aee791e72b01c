//! Configuration Module
//!
//! Handles loading provider and client settings from environment variables,
//! with an optional properties file underneath the provider settings.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const PLACEHOLDER_API_KEY: &str = "replace_me";

/// Properties file the demo binary reads provider settings from.
pub const DEFAULT_PROPERTIES_FILE: &str = "weather.properties";

/// (env var, properties key) pairs for each provider setting
const API_KEY_VARS: (&str, &str) = ("WEATHER_API_KEY", "weather.api.key");
const API_URL_VARS: (&str, &str) = ("WEATHER_API_URL", "weather.api.url");
const API_UNITS_VARS: (&str, &str) = ("WEATHER_API_UNITS", "weather.api.units");
const API_LANG_VARS: (&str, &str) = ("WEATHER_API_LANG", "weather.api.lang");

// == Work Mode ==
/// How the client keeps its cache warm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkMode {
    /// Fetch only when a caller misses the cache
    #[default]
    OnDemand,
    /// Additionally refresh every cached key in the background
    Polling,
}

impl WorkMode {
    /// Parses `on_demand` / `polling`, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "on_demand" | "on-demand" | "ondemand" => Some(Self::OnDemand),
            "polling" => Some(Self::Polling),
            _ => None,
        }
    }
}

// == Provider Settings ==
/// Settings for the OpenWeather endpoint.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API key; also the credential the client registers under
    pub api_key: Option<String>,
    /// Endpoint URL for current weather
    pub base_url: String,
    /// Unit system (`metric`, `imperial`, `standard`)
    pub units: String,
    /// Response language code
    pub lang: String,
}

impl ApiConfig {
    /// Loads provider settings from environment variables.
    ///
    /// # Environment Variables
    /// - `WEATHER_API_KEY` - API key (no default)
    /// - `WEATHER_API_URL` - Endpoint (default: OpenWeather current weather)
    /// - `WEATHER_API_UNITS` - Units (default: metric)
    /// - `WEATHER_API_LANG` - Language (default: en)
    pub fn from_env() -> Self {
        Self::resolve(&HashMap::new(), |name| env::var(name).ok())
    }

    /// Loads provider settings from a properties file, letting environment
    /// variables override each value.
    ///
    /// The file holds `key=value` lines (`weather.api.key`, `weather.api.url`,
    /// `weather.api.units`, `weather.api.lang`). An absent file is skipped;
    /// an unreadable one is logged as a warning. Either way it counts as empty.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let file = read_properties(path.as_ref());
        Self::resolve(&file, |name| env::var(name).ok())
    }

    /// Picks each setting from `env`, then `file`, then the default.
    fn resolve<E>(file: &HashMap<String, String>, env: E) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |(var, property): (&str, &str)| {
            env(var).or_else(|| file.get(property).cloned())
        };

        Self {
            api_key: lookup(API_KEY_VARS).filter(|k| !k.trim().is_empty()),
            base_url: lookup(API_URL_VARS).unwrap_or(defaults.base_url),
            units: lookup(API_UNITS_VARS).unwrap_or(defaults.units),
            lang: lookup(API_LANG_VARS).unwrap_or(defaults.lang),
        }
    }

    /// Returns the key if it is set and not the sample placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_URL.to_string(),
            units: "metric".to_string(),
            lang: "en".to_string(),
        }
    }
}

// == Client Settings ==
/// Cache and refresh settings for the client.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Maximum number of cities held in the cache
    pub cache_size: usize,
    /// How long a cached reading stays servable
    pub ttl: Duration,
    /// On-demand or polling
    pub work_mode: WorkMode,
    /// Interval between background refreshes when polling
    pub refresh_interval: Duration,
    /// Cities the demo binary requests
    pub cities: Vec<String>,
}

impl SdkConfig {
    /// Loads client settings from environment variables.
    ///
    /// # Environment Variables
    /// - `WEATHER_CACHE_SIZE` - Cache capacity (default: 5)
    /// - `WEATHER_TTL_MINUTES` - Entry TTL in minutes (default: 3)
    /// - `WEATHER_MODE` - `on_demand` or `polling` (default: on_demand)
    /// - `WEATHER_REFRESH_SECS` - Polling interval in seconds (default: the TTL)
    /// - `WEATHER_CITY` - Comma-separated cities (default: London)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let ttl = env::var("WEATHER_TTL_MINUTES")
            .ok()
            .and_then(|v| parse_minutes(&v))
            .unwrap_or(defaults.ttl);

        let work_mode = match env::var("WEATHER_MODE") {
            Ok(raw) => WorkMode::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown WEATHER_MODE '{}', falling back to on_demand", raw);
                WorkMode::OnDemand
            }),
            Err(_) => defaults.work_mode,
        };

        Self {
            cache_size: env::var("WEATHER_CACHE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_size),
            ttl,
            work_mode,
            refresh_interval: env::var("WEATHER_REFRESH_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(ttl),
            cities: env::var("WEATHER_CITY")
                .map(|raw| parse_cities(&raw))
                .unwrap_or(defaults.cities),
        }
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            cache_size: 5,
            ttl: Duration::from_secs(3 * 60),
            work_mode: WorkMode::OnDemand,
            refresh_interval: Duration::from_secs(3 * 60),
            cities: vec!["London".to_string()],
        }
    }
}

/// Parses a whole number of minutes; `None` if invalid or too large.
fn parse_minutes(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(|minutes| minutes.checked_mul(60))
        .map(Duration::from_secs)
}

fn read_properties(path: &Path) -> HashMap<String, String> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No properties file at {}", path.display());
            return HashMap::new();
        }
        Err(e) => {
            warn!("Could not load {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    let mut properties = HashMap::new();
    for entry in entries {
        match entry {
            Ok((key, value)) => {
                properties.insert(key, value);
            }
            Err(e) => warn!("Skipping malformed line in {}: {}", path.display(), e),
        }
    }
    debug!("Loaded {} properties from {}", properties.len(), path.display());
    properties
}

/// Splits a comma-separated list, trimming and dropping blanks and repeats.
pub fn parse_cities(raw: &str) -> Vec<String> {
    let mut cities: Vec<String> = Vec::new();
    for city in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if !cities.iter().any(|c| c == city) {
            cities.push(city.to_string());
        }
    }
    cities
}
