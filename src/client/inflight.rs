//! In-flight fetch table
//!
//! A keyed async mutex. The first caller to miss on a key inserts a token;
//! concurrent callers for the same key queue on it. Tokens for different
//! keys never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Token = Arc<Mutex<()>>;

// == In-Flight Table ==
#[derive(Debug, Default)]
pub struct InFlightTable {
    tokens: Arc<DashMap<String, Token>>,
}

impl InFlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    // == Acquire ==
    /// Waits for exclusive ownership of `key`'s token.
    ///
    /// Lookup and creation happen under one shard lock, so two callers can
    /// never end up holding different tokens for the same key.
    pub async fn acquire(&self, key: &str) -> InFlightGuard {
        let token = self
            .tokens
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let mut guard = InFlightGuard {
            tokens: Arc::clone(&self.tokens),
            key: key.to_string(),
            token: Arc::clone(&token),
            permit: None,
        };
        guard.permit = Some(token.lock_owned().await);
        guard
    }

    /// Number of keys with a live token.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// == Guard ==
/// Exclusive ownership of one key's token.
///
/// Dropping the guard hands the token to the next queued caller. The entry
/// leaves the table once nobody else holds or waits on it.
#[derive(Debug)]
pub struct InFlightGuard {
    tokens: Arc<DashMap<String, Token>>,
    key: String,
    token: Token,
    permit: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.permit.take();

        // Clones are only handed out under the shard lock, so a count of two
        // (table + this guard) means no other caller can reach this token.
        self.tokens.remove_if(&self.key, |_, token| {
            Arc::ptr_eq(token, &self.token) && Arc::strong_count(token) == 2
        });
    }
}
