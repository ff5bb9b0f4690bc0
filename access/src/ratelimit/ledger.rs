//! Quota ledger abstraction.
//!
//! A counter store provides exactly one mutation primitive: an atomic
//! increment-with-expiry addressed by [`QuotaKey`]. Everything else in the
//! rate limiter is pure policy arithmetic on top of it.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;

use super::types::QuotaKey;

/// State of one quota window after an increment.
#[derive(Debug, Clone, Copy)]
pub struct WindowState {
    /// Events counted in the current window, including this one.
    pub count: u32,
    /// Seconds until the window resets.
    pub reset_in_secs: u64,
}

/// Errors from the counter store.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// The backing store is unreachable.
    #[error("quota counter store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Atomic increment-with-expiry counter store.
///
/// The window is created with the given duration on first touch; calls
/// within the window increment the same counter; once the duration elapses
/// the counter is logically reset (lazy expiry, no sweeps). Implementations
/// must make the increment a single atomic operation so concurrent requests
/// never race to create two counters for one logical window, and must not
/// block callers beyond that atomicity.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increments the counter for `key` and returns the window state.
    ///
    /// The increment happens unconditionally; callers decide afterwards
    /// whether the count exceeds their limit. No request peeks without
    /// being counted.
    async fn increment(&self, key: &QuotaKey, window_secs: u64) -> Result<WindowState, QuotaError>;
}

/// Clock seam for window arithmetic.
///
/// Production code uses [`SystemClock`]; tests substitute a manual clock to
/// drive window expiry deterministically.
pub trait Clock: Send + Sync {
    /// Current time as whole seconds since the Unix epoch.
    fn now_secs(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
