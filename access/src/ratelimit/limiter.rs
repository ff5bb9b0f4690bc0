//! Tiered, action-scoped rate limiter.

use std::sync::Arc;

use uuid::Uuid;

use super::config::PolicyTable;
use super::ledger::{CounterStore, QuotaError};
use super::types::{ActionKind, QuotaDecision, QuotaKey};
use crate::permissions::Tier;

/// Rate limiter combining the static policy table with a counter store.
///
/// Constructed once at process start and shared by handle; never
/// re-initialized per request.
#[derive(Clone)]
pub struct RateLimiter<C> {
    store: Arc<C>,
    policies: Arc<PolicyTable>,
}

impl<C: CounterStore> RateLimiter<C> {
    pub fn new(store: Arc<C>, policies: PolicyTable) -> Self {
        Self {
            store,
            policies: Arc::new(policies),
        }
    }

    /// Checks and consumes one quota slot for `(subject, action)`.
    ///
    /// The counter is incremented even when the outcome is a denial, so a
    /// burst of concurrent requests at the window boundary is charged
    /// exactly once each and the (N+1)-th is the first to be denied. The
    /// charge is never refunded if the caller later abandons the request.
    ///
    /// # Errors
    /// Returns [`QuotaError`] when the counter store is unreachable; the
    /// caller decides how that propagates.
    #[tracing::instrument(skip(self), fields(action = %action.as_str()))]
    pub async fn check(
        &self,
        subject: Uuid,
        action: ActionKind,
        tier: Tier,
    ) -> Result<QuotaDecision, QuotaError> {
        if !self.policies.enabled {
            return Ok(QuotaDecision {
                allowed: true,
                limit: 0,
                remaining: 0,
                retry_after: 0,
            });
        }

        let policy = self.policies.limit_for(action, tier);
        let key = QuotaKey { subject, action };
        let window = self.store.increment(&key, policy.window_secs).await?;

        let allowed = window.count <= policy.requests;
        if !allowed {
            tracing::debug!(
                subject = %subject,
                count = window.count,
                limit = policy.requests,
                retry_after = window.reset_in_secs,
                "quota exceeded"
            );
        }

        Ok(QuotaDecision {
            allowed,
            limit: policy.requests,
            remaining: if allowed {
                policy.requests - window.count
            } else {
                0
            },
            retry_after: if allowed { 0 } else { window.reset_in_secs },
        })
    }

    /// Returns the policy table backing this limiter.
    #[must_use]
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }
}
