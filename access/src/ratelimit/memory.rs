//! In-process quota counter store.
//!
//! One entry per quota key holds `(bucket, count)` where `bucket` is the
//! current time truncated to the window duration, so every request in one
//! logical window lands on the same entry without coordination. Expiry is
//! lazy: once the bucket index moves on, the next touch resets the count
//! in place, so the map holds at most one entry per quota key no matter
//! how long a subject stays idle.

use async_trait::async_trait;
use dashmap::DashMap;

use super::config::quota_key_string;
use super::ledger::{Clock, CounterStore, QuotaError, SystemClock, WindowState};
use super::types::QuotaKey;

/// Counter store backed by a concurrent hash map.
///
/// Suitable for single-process deployments and tests; multi-node
/// deployments share quota state through [`super::redis::RedisCounterStore`].
pub struct MemoryCounterStore<C = SystemClock> {
    clock: C,
    counters: DashMap<String, (u64, u32)>,
}

impl MemoryCounterStore<SystemClock> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryCounterStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryCounterStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            counters: DashMap::new(),
        }
    }

    /// Current count in the live window without charging it.
    ///
    /// Introspection only (tests, ops tooling); enforcement always goes
    /// through [`CounterStore::increment`].
    #[must_use]
    pub fn current(&self, key: &QuotaKey, window_secs: u64) -> u32 {
        let bucket = self.clock.now_secs() / window_secs.max(1);
        self.counters
            .get(&quota_key_string(key))
            .filter(|entry| entry.0 == bucket)
            .map_or(0, |entry| entry.1)
    }
}

#[async_trait]
impl<C: Clock> CounterStore for MemoryCounterStore<C> {
    async fn increment(&self, key: &QuotaKey, window_secs: u64) -> Result<WindowState, QuotaError> {
        let window = window_secs.max(1);
        let now = self.clock.now_secs();
        let bucket = now / window;

        // The entry guard holds the shard lock, making read-modify-write
        // atomic. A stale bucket's count is reset in place rather than left
        // behind under another key, so idle keys never accumulate entries.
        let mut entry = self
            .counters
            .entry(quota_key_string(key))
            .or_insert((bucket, 0));
        if entry.0 != bucket {
            *entry = (bucket, 0);
        }
        entry.1 += 1;
        let count = entry.1;
        drop(entry);

        Ok(WindowState {
            count,
            reset_in_secs: window - (now % window),
        })
    }
}
