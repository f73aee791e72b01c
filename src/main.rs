//! Weather Cache - demo client
//!
//! Fetches the configured cities through the caching client, twice each so
//! the second read is served from cache, then waits for two refresh cycles
//! when polling is enabled.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_cache::config::DEFAULT_PROPERTIES_FILE;
use weather_cache::{
    ApiConfig, ClientBuilder, ClientRegistry, OpenWeatherFetcher, SdkConfig, WeatherClient,
    WorkMode,
};

/// Main entry point for the weather cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load provider settings (properties file, then env) and client settings (env)
/// 3. Build the OpenWeather fetcher and the caching client
/// 4. Request every configured city twice
/// 5. When polling, wait for two refresh cycles (or Ctrl+C / SIGTERM)
/// 6. Close the client
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting weather cache client");

    let api_config = ApiConfig::load(DEFAULT_PROPERTIES_FILE);
    let sdk_config = SdkConfig::from_env();
    info!(
        "Configuration loaded: cache_size={}, ttl={:?}, mode={:?}, refresh={:?}, cities={}",
        sdk_config.cache_size,
        sdk_config.ttl,
        sdk_config.work_mode,
        sdk_config.refresh_interval,
        sdk_config.cities.join(", ")
    );

    let fetcher = Arc::new(
        OpenWeatherFetcher::new(&api_config).context("Failed to set up OpenWeather fetcher")?,
    );
    let registry = Arc::new(ClientRegistry::new());
    let client = ClientBuilder::from_config(&sdk_config)
        .credential_id(fetcher.api_key())
        .build(Arc::clone(&fetcher), &registry)
        .await
        .context("Failed to build weather client")?;

    for city in &sdk_config.cities {
        print_weather(&client, city, "Requesting weather").await;
        print_weather(&client, city, "Repeated call (should be cached)").await;
    }

    if sdk_config.work_mode == WorkMode::Polling {
        let wait = sdk_config.refresh_interval.saturating_mul(2);
        info!(
            "Polling every {:?}; waiting {:?} to observe refresh",
            sdk_config.refresh_interval, wait
        );
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown_signal() => {}
        }
        let stats = client.stats().await;
        info!(
            "Cache after polling: {} entries, hit rate {:.0}%, {} evictions",
            stats.total_entries,
            stats.hit_rate() * 100.0,
            stats.evictions
        );
    } else {
        info!("On-demand mode, polling disabled");
    }

    client.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn print_weather(client: &WeatherClient, city: &str, label: &str) {
    println!("{} for city: {}", label, city);
    match client.get_value(city).await {
        Ok(data) => match serde_json::to_string_pretty(&data) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to render weather for '{}': {}", city, e),
        },
        Err(e) => error!("Failed to get weather for '{}': {}", city, e),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
