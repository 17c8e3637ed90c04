use std::collections::HashSet;

use parking_lot::Mutex;
use rand::seq::IteratorRandom;
use tracing::{debug, info};

use super::store::ProxyStore;
use crate::common::types::ProxyEndpoint;

#[derive(Debug, Default)]
struct PoolState {
    /// Every relay admitted by the last refresh, minus evictions.
    all: HashSet<ProxyEndpoint>,
    /// Relays currently believed usable. Always a subset of `all`.
    working: HashSet<ProxyEndpoint>,
}

/// Concurrency-safe set of relays used to route extraction traffic.
///
/// Selection, eviction and replacement all go through one lock. The
/// snapshot write happens inside the same critical section.
pub struct ProxyPool {
    state: Mutex<PoolState>,
    store: Option<ProxyStore>,
}

impl ProxyPool {
    /// In-memory pool with no persistence.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            store: None,
        }
    }

    /// Pool seeded from the last persisted snapshot, if any.
    pub fn restore(store: ProxyStore) -> Self {
        let working: HashSet<ProxyEndpoint> = store.load().into_iter().collect();
        Self {
            state: Mutex::new(PoolState {
                all: working.clone(),
                working,
            }),
            store: Some(store),
        }
    }

    /// Uniformly random working relay. The relay stays in the pool.
    pub fn get_proxy(&self) -> Option<ProxyEndpoint> {
        let state = self.state.lock();
        state.working.iter().choose(&mut rand::thread_rng()).cloned()
    }

    /// Evicts `proxy`. Unknown relays are ignored.
    pub fn remove_proxy(&self, proxy: &ProxyEndpoint) {
        let mut state = self.state.lock();
        let in_working = state.working.remove(proxy);
        let in_all = state.all.remove(proxy);
        if !in_working && !in_all {
            return;
        }

        self.persist(&state);
        info!(
            "Removed bad proxy: {} ({} remaining)",
            proxy,
            state.working.len()
        );
    }

    /// Swaps the whole pool for a freshly validated set.
    pub fn replace_all<I>(&self, proxies: I)
    where
        I: IntoIterator<Item = ProxyEndpoint>,
    {
        let fresh: HashSet<ProxyEndpoint> = proxies.into_iter().collect();
        let mut state = self.state.lock();
        state.working = fresh.clone();
        state.all = fresh;

        self.persist(&state);
        info!("Proxy pool replaced: {} working proxies", state.working.len());
    }

    pub fn len(&self) -> usize {
        self.state.lock().working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().working.is_empty()
    }

    pub fn known_len(&self) -> usize {
        self.state.lock().all.len()
    }

    /// Sorted copy of the working set.
    pub fn snapshot(&self) -> Vec<ProxyEndpoint> {
        let mut proxies: Vec<ProxyEndpoint> = self.state.lock().working.iter().cloned().collect();
        proxies.sort();
        proxies
    }

    fn persist(&self, state: &PoolState) {
        match &self.store {
            Some(store) => store.save(&state.working),
            None => debug!("Proxy pool has no store, skipping snapshot"),
        }
    }
}

impl Default for ProxyPool {
    fn default() -> Self {
        Self::new()
    }
}
