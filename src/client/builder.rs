//! Client Builder
//!
//! Validates client settings, then builds, registers and (when polling)
//! starts the refresh task for a [`CachingClient`].

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::CacheStore;
use crate::client::registry::mask_credential;
use crate::client::{CachingClient, ClientRegistry};
use crate::config::{SdkConfig, WorkMode};
use crate::error::{ClientError, Result};
use crate::fetcher::Fetcher;

/// Time `close` waits for an in-progress refresh cycle before aborting it.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// == Client Builder ==
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    credential_id: Option<String>,
    capacity: usize,
    ttl: Duration,
    work_mode: WorkMode,
    refresh_interval: Option<Duration>,
    shutdown_grace: Duration,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::from_config(&SdkConfig::default())
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from loaded settings; the credential still has to be set.
    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            credential_id: None,
            capacity: config.cache_size,
            ttl: config.ttl,
            work_mode: config.work_mode,
            refresh_interval: Some(config.refresh_interval),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Credential the client registers under (usually the API key).
    pub fn credential_id(mut self, id: impl Into<String>) -> Self {
        self.credential_id = Some(id.into());
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn work_mode(mut self, mode: WorkMode) -> Self {
        self.work_mode = mode;
        self
    }

    /// Polling interval; defaults to the TTL when unset.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    // == Build ==
    /// Builds the client and registers it in `registry`.
    ///
    /// # Errors
    /// - `Configuration` for a blank credential, zero capacity, or a zero
    ///   polling interval
    /// - `DuplicateClient` if the credential already has a live client
    pub async fn build<F>(
        self,
        fetcher: Arc<F>,
        registry: &Arc<ClientRegistry<F::Value>>,
    ) -> Result<Arc<CachingClient<F::Value>>>
    where
        F: Fetcher + 'static,
    {
        let credential_id = self
            .credential_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClientError::Configuration("Missing credential id".to_string()))?
            .to_string();

        if self.capacity == 0 {
            return Err(ClientError::Configuration(
                "Cache capacity must be at least 1".to_string(),
            ));
        }

        let interval = match self.work_mode {
            WorkMode::OnDemand => None,
            WorkMode::Polling => {
                let interval = self.refresh_interval.unwrap_or(self.ttl);
                if interval.is_zero() {
                    return Err(ClientError::Configuration(
                        "Polling requires a refresh interval greater than zero".to_string(),
                    ));
                }
                Some(interval)
            }
        };

        let client = Arc::new(CachingClient::new(
            credential_id.clone(),
            CacheStore::new(self.capacity, self.ttl),
            fetcher,
            Arc::downgrade(registry),
            self.shutdown_grace,
        ));
        let client = registry.register(&credential_id, client)?;

        info!(
            "Client registered for credential {} (capacity={}, ttl={:?}, mode={:?})",
            mask_credential(&credential_id),
            self.capacity,
            self.ttl,
            self.work_mode
        );

        if let Some(interval) = interval {
            if let Err(e) = client.start_refresh(interval).await {
                client.close().await;
                return Err(e);
            }
        }

        Ok(client)
    }
}
