//! Background Refresh Task
//!
//! Periodically re-fetches every live cache key so polling clients keep
//! serving fresh data without foreground misses.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::error::{ClientError, Result};
use crate::fetcher::Fetcher;

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Keys re-fetched and written back
    pub refreshed: usize,
    /// Keys whose fetch failed; their cached value was left in place
    pub failed: usize,
}

#[derive(Debug)]
enum SchedulerState {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

// == Refresh Scheduler ==
/// Owns the background refresh task.
///
/// Moves `Idle -> Running -> Stopped`; once stopped it cannot be restarted.
/// Dropping a running scheduler cancels its task.
#[derive(Debug)]
pub struct RefreshScheduler {
    state: SchedulerState,
    cancel: CancellationToken,
    cycles: Arc<AtomicU64>,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            cancel: CancellationToken::new(),
            cycles: Arc::new(AtomicU64::new(0)),
        }
    }

    // == Start ==
    /// Spawns the refresh loop. The first cycle runs immediately, then one
    /// every `interval`.
    ///
    /// # Errors
    /// - `Configuration` if `interval` is zero or the scheduler already runs
    /// - `Closed` if the scheduler was shut down
    pub fn start<V>(
        &mut self,
        cache: Arc<RwLock<CacheStore<V>>>,
        fetcher: Arc<dyn Fetcher<Value = V>>,
        interval: Duration,
    ) -> Result<()>
    where
        V: Clone + Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(ClientError::Configuration(
                "Refresh interval must be greater than zero".to_string(),
            ));
        }
        match self.state {
            SchedulerState::Idle => {}
            SchedulerState::Running(_) => {
                return Err(ClientError::Configuration(
                    "Refresh scheduler already running".to_string(),
                ))
            }
            SchedulerState::Stopped => return Err(ClientError::Closed),
        }

        info!("Starting refresh task with interval of {:?}", interval);

        let cancel = self.cancel.clone();
        let cycles = Arc::clone(&self.cycles);
        let handle = tokio::spawn(refresh_loop(cache, fetcher, interval, cancel, cycles));
        self.state = SchedulerState::Running(handle);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        matches!(&self.state, SchedulerState::Running(handle) if !handle.is_finished())
    }

    /// Number of cycles that have run to completion (or panicked).
    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    // == Shutdown ==
    /// Stops the loop, waiting up to `grace` for an in-progress cycle before
    /// aborting it. Never fails; calling it on an idle or stopped scheduler
    /// only marks it stopped.
    pub async fn shutdown(&mut self, grace: Duration) {
        self.cancel.cancel();

        let SchedulerState::Running(mut handle) =
            std::mem::replace(&mut self.state, SchedulerState::Stopped)
        else {
            return;
        };

        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => info!("Refresh task stopped"),
            Ok(Err(e)) => warn!("Refresh task ended abnormally: {}", e),
            Err(_) => {
                warn!("Refresh task did not stop within {:?}, aborting", grace);
                handle.abort();
            }
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let SchedulerState::Running(handle) = &self.state {
            handle.abort();
        }
    }
}

async fn refresh_loop<V>(
    cache: Arc<RwLock<CacheStore<V>>>,
    fetcher: Arc<dyn Fetcher<Value = V>>,
    interval: Duration,
    cancel: CancellationToken,
    cycles: Arc<AtomicU64>,
) where
    V: Clone + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let cycle = AssertUnwindSafe(run_refresh_cycle(&*cache, fetcher.as_ref(), &cancel));
        match cycle.catch_unwind().await {
            Ok(summary) if summary.failed > 0 => info!(
                "Refresh cycle: {} refreshed, {} failed",
                summary.refreshed, summary.failed
            ),
            Ok(summary) => debug!("Refresh cycle: {} refreshed", summary.refreshed),
            Err(_) => error!("Refresh cycle panicked; continuing with next cycle"),
        }
        cycles.fetch_add(1, Ordering::AcqRel);
    }

    debug!("Refresh loop exited");
}

// == Refresh Cycle ==
/// Re-fetches every non-expired key once.
///
/// Fetches run outside the cache lock. A failed key keeps its current value;
/// cancellation stops the cycle before the next write.
pub async fn run_refresh_cycle<V>(
    cache: &RwLock<CacheStore<V>>,
    fetcher: &dyn Fetcher<Value = V>,
    cancel: &CancellationToken,
) -> RefreshSummary
where
    V: Clone + Send + Sync + 'static,
{
    let keys: Vec<String> = {
        let guard = cache.read().await;
        guard.snapshot().into_iter().map(|(key, _)| key).collect()
    };

    let mut summary = RefreshSummary::default();
    if keys.is_empty() {
        return summary;
    }

    for key in keys {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = fetcher.fetch(&key) => result,
        };

        match result {
            Ok(value) => {
                cache.write().await.put(key, value);
                summary.refreshed += 1;
            }
            Err(e) => {
                warn!("Refresh failed for '{}', keeping cached value: {}", key, e);
                summary.failed += 1;
            }
        }
    }

    summary
}
