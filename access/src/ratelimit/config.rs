//! Quota policy configuration.
//!
//! The policy table is built once at process start (defaults or environment
//! overrides) and is immutable for the process lifetime; request-scoped
//! components share it by `Arc`.

use super::types::{ActionKind, QuotaKey};
use crate::permissions::Tier;

/// Configuration for a single quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitConfig {
    /// Maximum requests allowed in the window
    pub requests: u32,
    /// Window duration in seconds
    pub window_secs: u64,
}

/// Per-action quota policy for both tiers.
///
/// A missing premium override means premium users receive the regular
/// policy. Premium only ever grants more headroom, never less.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionLimits {
    pub regular: LimitConfig,
    pub premium: Option<LimitConfig>,
}

impl ActionLimits {
    const fn flat(requests: u32, window_secs: u64) -> Self {
        Self {
            regular: LimitConfig { requests, window_secs },
            premium: None,
        }
    }
}

/// Static quota policy table: action kind × tier → limit.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    /// Whether quota enforcement is enabled
    pub enabled: bool,
    pub post_create: ActionLimits,
    pub chat_send: ActionLimits,
    pub chat_create: ActionLimits,
    pub follow: ActionLimits,
    pub ai_assist: ActionLimits,
    pub feed_read: ActionLimits,
    pub notification_read: ActionLimits,
    pub role_admin: ActionLimits,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            enabled: true,
            post_create: ActionLimits::flat(1, 10),
            chat_send: ActionLimits::flat(5, 1),
            chat_create: ActionLimits::flat(2, 10),
            follow: ActionLimits::flat(10, 60),
            ai_assist: ActionLimits {
                regular: LimitConfig { requests: 3, window_secs: 3600 },
                premium: Some(LimitConfig { requests: 10, window_secs: 3600 }),
            },
            feed_read: ActionLimits::flat(60, 60),
            notification_read: ActionLimits::flat(60, 60),
            role_admin: ActionLimits::flat(10, 60),
        }
    }
}

impl PolicyTable {
    /// Creates the policy table from environment variables.
    ///
    /// Environment variables:
    /// - `QUOTA_ENABLED`: Enable/disable quota enforcement (default: true)
    /// - `QUOTA_<ACTION>`: Regular-tier limit as "requests,window_secs",
    ///   where `<ACTION>` is the upper-cased action identifier
    ///   (e.g. `QUOTA_POST_CREATE=1,10`)
    /// - `QUOTA_<ACTION>_PREMIUM`: Premium-tier override, same format
    pub fn from_env() -> Self {
        let mut table = Self::default();

        if let Ok(val) = std::env::var("QUOTA_ENABLED") {
            table.enabled = val.parse().unwrap_or(true);
        }

        for &action in ActionKind::all() {
            let var = format!("QUOTA_{}", action.as_str().to_uppercase());
            if let Ok(val) = std::env::var(&var) {
                if let Some(limit) = parse_limit_config(&val) {
                    table.limits_mut(action).regular = limit;
                }
            }
            if let Ok(val) = std::env::var(format!("{var}_PREMIUM")) {
                if let Some(limit) = parse_limit_config(&val) {
                    table.limits_mut(action).premium = Some(limit);
                }
            }
        }

        table
    }

    /// Returns the policy for an action and tier.
    ///
    /// Premium falls back to the regular policy when no override exists.
    #[must_use]
    pub const fn limit_for(&self, action: ActionKind, tier: Tier) -> LimitConfig {
        let limits = self.limits(action);
        match tier {
            Tier::Premium => match limits.premium {
                Some(limit) => limit,
                None => limits.regular,
            },
            Tier::Regular => limits.regular,
        }
    }

    const fn limits(&self, action: ActionKind) -> &ActionLimits {
        match action {
            ActionKind::PostCreate => &self.post_create,
            ActionKind::ChatSend => &self.chat_send,
            ActionKind::ChatCreate => &self.chat_create,
            ActionKind::Follow => &self.follow,
            ActionKind::AiAssist => &self.ai_assist,
            ActionKind::FeedRead => &self.feed_read,
            ActionKind::NotificationRead => &self.notification_read,
            ActionKind::RoleAdmin => &self.role_admin,
        }
    }

    fn limits_mut(&mut self, action: ActionKind) -> &mut ActionLimits {
        match action {
            ActionKind::PostCreate => &mut self.post_create,
            ActionKind::ChatSend => &mut self.chat_send,
            ActionKind::ChatCreate => &mut self.chat_create,
            ActionKind::Follow => &mut self.follow,
            ActionKind::AiAssist => &mut self.ai_assist,
            ActionKind::FeedRead => &mut self.feed_read,
            ActionKind::NotificationRead => &mut self.notification_read,
            ActionKind::RoleAdmin => &mut self.role_admin,
        }
    }
}

/// Builds the counter key for one quota window (without bucket suffix).
#[must_use]
pub fn quota_key_string(key: &QuotaKey) -> String {
    format!("{}:{}", key.action.as_str(), key.subject)
}

/// Parses a limit config from "requests,window_secs" format.
///
/// A zero window would make every counter expire instantly; such configs
/// are rejected.
fn parse_limit_config(val: &str) -> Option<LimitConfig> {
    let (requests, window_secs) = val.split_once(',')?;
    let requests = requests.trim().parse().ok()?;
    let window_secs: u64 = window_secs.trim().parse().ok()?;
    if window_secs == 0 {
        return None;
    }
    Some(LimitConfig { requests, window_secs })
}
