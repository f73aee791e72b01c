//! Coalescing Client
//!
//! Fronts a [`Fetcher`] with a [`CacheStore`]. Concurrent misses on the same
//! key share one upstream call; hits never touch the in-flight table.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::client::inflight::InFlightTable;
use crate::client::registry::{mask_credential, ClientRegistry};
use crate::error::{ClientError, Result};
use crate::fetcher::Fetcher;
use crate::tasks::RefreshScheduler;

// == Caching Client ==
/// Cache-first client for one credential.
///
/// Built by [`ClientBuilder`](crate::client::ClientBuilder), which registers
/// it and starts the refresh task in polling mode.
pub struct CachingClient<V> {
    credential_id: String,
    cache: Arc<RwLock<CacheStore<V>>>,
    fetcher: Arc<dyn Fetcher<Value = V>>,
    in_flight: InFlightTable,
    scheduler: Mutex<Option<RefreshScheduler>>,
    registry: Weak<ClientRegistry<V>>,
    shutdown_grace: Duration,
    closed: AtomicBool,
}

impl<V> CachingClient<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        credential_id: String,
        cache: CacheStore<V>,
        fetcher: Arc<dyn Fetcher<Value = V>>,
        registry: Weak<ClientRegistry<V>>,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            credential_id,
            cache: Arc::new(RwLock::new(cache)),
            fetcher,
            in_flight: InFlightTable::new(),
            scheduler: Mutex::new(None),
            registry,
            shutdown_grace,
            closed: AtomicBool::new(false),
        }
    }

    /// Starts background refresh of every cached key.
    pub(crate) async fn start_refresh(&self, interval: Duration) -> Result<()> {
        let mut slot = self.scheduler.lock().await;
        let scheduler = slot.get_or_insert_with(RefreshScheduler::new);
        scheduler.start(Arc::clone(&self.cache), Arc::clone(&self.fetcher), interval)
    }

    // == Get Value ==
    /// Returns the cached value for `key`, fetching it on a miss.
    ///
    /// At most one fetch per key is in flight. Callers queued behind it
    /// re-check the cache once they own the key; if the fetch failed, the next
    /// queued caller fetches again. Failures are never cached.
    ///
    /// # Errors
    /// - `Closed` once [`close`](Self::close) has been called
    /// - `Fetch` when the upstream call fails
    pub async fn get_value(&self, key: &str) -> Result<V> {
        self.ensure_open()?;

        let cached = self.cache.write().await.get(key);
        if let Some(value) = cached {
            debug!("Cache hit for '{}'", key);
            return Ok(value);
        }

        let _token = self.in_flight.acquire(key).await;
        self.ensure_open()?;

        let cached = self.cache.write().await.get(key);
        if let Some(value) = cached {
            debug!("Served '{}' from a coalesced fetch", key);
            return Ok(value);
        }

        debug!("Cache miss for '{}', fetching", key);
        let value = self.fetcher.fetch(key).await?;

        // Checked under the lock: close sets the flag before it clears, so a
        // put that sees the flag unset is wiped by that clear
        let mut cache = self.cache.write().await;
        if !self.is_closed() {
            cache.put(key.to_string(), value.clone());
        }
        Ok(value)
    }

    /// Drops the cached value for `key`. Returns true if one was present.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.write().await.remove(key)
    }

    /// Keys currently servable, most recently used first.
    pub async fn cached_keys(&self) -> Vec<String> {
        self.cache
            .read()
            .await
            .snapshot()
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// True while a refresh task is active.
    pub async fn is_polling(&self) -> bool {
        self.scheduler
            .lock()
            .await
            .as_ref()
            .is_some_and(RefreshScheduler::is_running)
    }

    // == Close ==
    /// Stops refresh, clears the cache and leaves the registry.
    ///
    /// Only the first call does anything; later calls log a warning.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            warn!(
                "Client for credential {} is already closed",
                mask_credential(&self.credential_id)
            );
            return;
        }

        let scheduler = self.scheduler.lock().await.take();
        if let Some(mut scheduler) = scheduler {
            scheduler.shutdown(self.shutdown_grace).await;
        }

        self.cache.write().await.clear();

        if let Some(registry) = self.registry.upgrade() {
            registry.deregister(&self.credential_id, self);
        }

        info!(
            "Client for credential {} closed",
            mask_credential(&self.credential_id)
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn credential_id(&self) -> &str {
        &self.credential_id
    }

    #[cfg(test)]
    pub(crate) fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(ClientError::Closed)
        } else {
            Ok(())
        }
    }
}

impl<V> fmt::Debug for CachingClient<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingClient")
            .field("credential_id", &mask_credential(&self.credential_id))
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
