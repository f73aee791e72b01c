//! Scripted fetcher shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetcher::Fetcher;

/// Returns `"{prefix}-{key}"` after an optional delay, failing or panicking
/// on configured keys, and counts every call.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    prefix: String,
    delay: Duration,
    failing: Mutex<HashSet<String>>,
    panicking: HashSet<String>,
    calls: AtomicUsize,
    calls_by_key: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_on(self, key: &str) -> Self {
        self.set_failing(key, true);
        self
    }

    pub fn panicking_on(mut self, key: &str) -> Self {
        self.panicking.insert(key.to_string());
        self
    }

    /// Toggles failure for `key` while the fetcher is in use.
    pub fn set_failing(&self, key: &str, failing: bool) {
        let mut keys = self.failing.lock().unwrap();
        if failing {
            keys.insert(key.to_string());
        } else {
            keys.remove(key);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, key: &str) -> usize {
        self.calls_by_key.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    type Value = String;

    async fn fetch(&self, key: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_key
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert(0) += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panicking.contains(key) {
            panic!("scripted panic for '{}'", key);
        }
        if self.failing.lock().unwrap().contains(key) {
            return Err(FetchError::new(format!("scripted failure for '{}'", key)));
        }
        Ok(format!("{}-{}", self.prefix, key))
    }
}
