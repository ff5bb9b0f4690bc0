//! Tiered, action-scoped rate limiting.
//!
//! A static policy table maps `(action kind, tier)` to a sliding
//! fixed-bucket window; a counter store provides one atomic
//! increment-with-expiry primitive. Counting is optimistic: every attempt
//! is charged, denials included, and charges are never rolled back.

pub mod config;
pub mod ledger;
pub mod limiter;
pub mod memory;
pub mod redis;
pub mod types;

pub use config::{ActionLimits, LimitConfig, PolicyTable};
pub use ledger::{Clock, CounterStore, QuotaError, SystemClock, WindowState};
pub use limiter::RateLimiter;
pub use memory::MemoryCounterStore;
pub use redis::RedisCounterStore;
pub use types::{ActionKind, QuotaDecision, QuotaKey};
