//! Client Registry
//!
//! Table of live clients keyed by credential. One registry is created per
//! process (or per test) and shared as `Arc<ClientRegistry<V>>`.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::client::CachingClient;
use crate::error::{ClientError, Result};

// == Client Registry ==
/// Live clients by credential id. At most one client per credential.
#[derive(Debug)]
pub struct ClientRegistry<V> {
    clients: DashMap<String, Arc<CachingClient<V>>>,
}

impl<V> Default for ClientRegistry<V> {
    fn default() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }
}

impl<V> ClientRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Stores `client` under `id` and hands it back.
    ///
    /// Fails with [`ClientError::DuplicateClient`] if `id` is taken; the
    /// existing client stays registered.
    pub fn register(
        &self,
        id: &str,
        client: Arc<CachingClient<V>>,
    ) -> Result<Arc<CachingClient<V>>> {
        match self.clients.entry(id.to_string()) {
            Entry::Occupied(_) => Err(ClientError::DuplicateClient(mask_credential(id))),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&client));
                debug!("Registered client for credential {}", mask_credential(id));
                Ok(client)
            }
        }
    }

    /// Removes the client registered under `id`, if any.
    pub fn remove(&self, id: &str) -> Option<Arc<CachingClient<V>>> {
        self.clients.remove(id).map(|(_, client)| client)
    }

    /// Removes `id` only while it still maps to `client`.
    pub(crate) fn deregister(&self, id: &str, client: &CachingClient<V>) -> bool {
        self.clients
            .remove_if(id, |_, registered| std::ptr::eq(Arc::as_ptr(registered), client))
            .is_some()
    }

    pub fn get(&self, id: &str) -> Option<Arc<CachingClient<V>>> {
        self.clients.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.clients.contains_key(id)
    }

    /// Empties the registry without closing the clients.
    pub fn clear(&self) {
        self.clients.clear();
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Hides all but the last four characters of a credential.
pub fn mask_credential(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
