//! Redis-backed quota counter store.
//!
//! Used when several application nodes must share quota state. The
//! increment, first-touch expiry, and TTL read happen in one embedded Lua
//! script, so the whole window update is a single atomic round trip.

use std::sync::Arc;

use async_trait::async_trait;
use fred::prelude::*;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::config::quota_key_string;
use super::ledger::{CounterStore, QuotaError, WindowState};
use super::types::QuotaKey;

/// Embedded Lua script for the atomic quota increment.
const QUOTA_SCRIPT: &str = include_str!("quota.lua");

/// Counter store backed by Redis.
#[derive(Clone)]
pub struct RedisCounterStore {
    redis: Client,
    key_prefix: String,
    script_sha: Arc<RwLock<String>>,
}

impl RedisCounterStore {
    /// Creates a new store with the given key prefix (e.g. `"loam:quota"`).
    ///
    /// Call [`Self::init`] after creation to load the Lua script into Redis.
    #[must_use]
    pub fn new(redis: Client, key_prefix: impl Into<String>) -> Self {
        Self {
            redis,
            key_prefix: key_prefix.into(),
            script_sha: Arc::new(RwLock::new(String::new())),
        }
    }

    /// Loads the Lua script into Redis.
    pub async fn init(&self) -> Result<(), Error> {
        self.load_script().await
    }

    /// Loads or reloads the Lua script.
    ///
    /// Called during init and when NOSCRIPT errors are encountered.
    async fn load_script(&self) -> Result<(), Error> {
        let sha: String = self.redis.script_load(QUOTA_SCRIPT).await?;
        info!(quota_sha = %sha, "quota Lua script loaded into Redis");
        *self.script_sha.write().await = sha;
        Ok(())
    }

    /// Checks if an error is a NOSCRIPT error (script not found in Redis).
    fn is_noscript_error(error: &Error) -> bool {
        error.to_string().contains("NOSCRIPT")
    }

    fn build_key(&self, key: &QuotaKey) -> String {
        format!("{}:{}", self.key_prefix, quota_key_string(key))
    }

    async fn eval_quota_script(&self, key: &str, window_secs: u64) -> Result<Vec<i64>, QuotaError> {
        let sha = self.script_sha.read().await.clone();

        let result: Result<Vec<i64>, _> = self
            .redis
            .evalsha(&sha, vec![key], vec![window_secs.to_string()])
            .await;

        match result {
            Ok(r) => Ok(r),
            Err(e) if Self::is_noscript_error(&e) => {
                warn!("NOSCRIPT error, reloading quota Lua script");
                self.load_script().await.map_err(|e| {
                    warn!(error = %e, "failed to reload quota script");
                    QuotaError::StoreUnavailable(e.to_string())
                })?;

                // Retry with the new SHA
                let new_sha = self.script_sha.read().await.clone();
                self.redis
                    .evalsha(&new_sha, vec![key], vec![window_secs.to_string()])
                    .await
                    .map_err(|e| {
                        warn!(error = %e, "quota increment failed after script reload");
                        QuotaError::StoreUnavailable(e.to_string())
                    })
            }
            Err(e) => {
                warn!(error = %e, "quota increment failed");
                Err(QuotaError::StoreUnavailable(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &QuotaKey, window_secs: u64) -> Result<WindowState, QuotaError> {
        let redis_key = self.build_key(key);
        let result = self.eval_quota_script(&redis_key, window_secs.max(1)).await?;
        window_state_from_reply(&result)
    }
}

/// Converts the `{count, ttl}` script reply into a [`WindowState`].
///
/// Counts past `u32::MAX` saturate: any value at or above the policy limit
/// denies, so saturation preserves the decision. Negative TTL sentinels
/// clamp to zero.
fn window_state_from_reply(reply: &[i64]) -> Result<WindowState, QuotaError> {
    let [count, ttl] = reply else {
        return Err(QuotaError::StoreUnavailable(
            "quota script returned an unexpected shape".to_string(),
        ));
    };

    Ok(WindowState {
        count: u32::try_from((*count).max(0)).unwrap_or(u32::MAX),
        reset_in_secs: u64::try_from((*ttl).max(0)).unwrap_or(0),
    })
}
