use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval};

use super::{CounterStore, StoreError};

// Counter entry with optional expiry deadline
struct Counter {
    value: i64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-process counter store.
///
/// Only shares state within one process, so it is meant for tests and
/// single-instance development. Uses tokio's clock so paused-time tests can
/// drive expiry.
#[derive(Default)]
pub struct MemoryStore {
    counters: DashMap<String, Counter>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining time to live for `key`, `None` if the key is absent,
    /// expired or has no expiry.
    pub fn expires_in(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let counter = self.counters.get(key)?;
        if counter.is_expired(now) {
            return None;
        }
        counter.expires_at.map(|deadline| deadline - now)
    }

    /// Current value for `key`, `None` if absent or expired.
    pub fn get(&self, key: &str) -> Option<i64> {
        let counter = self.counters.get(key)?;
        (!counter.is_expired(Instant::now())).then_some(counter.value)
    }

    /// Drops expired counters.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.counters.retain(|_, counter| !counter.is_expired(now));
    }

    /// Purges expired counters every `period` until the store is dropped.
    pub fn spawn_purger(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else { break };
                store.purge_expired();
            }
        })
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let now = Instant::now();
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });

        // expired key behaves like an absent one
        if entry.is_expired(now) {
            entry.value = 0;
            entry.expires_at = None;
        }

        entry.value += 1;
        Ok(entry.value)
    }

    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<(), StoreError> {
        let now = Instant::now();
        if let Some(mut counter) = self.counters.get_mut(key)
            && !counter.is_expired(now)
        {
            counter.expires_at = Some(now + Duration::from_secs(seconds));
        }
        Ok(())
    }
}
