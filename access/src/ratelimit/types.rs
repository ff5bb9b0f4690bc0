//! Rate limiting types.

use serde::Serialize;
use uuid::Uuid;

/// Action kinds with independently configured quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Publishing a post
    PostCreate,
    /// Sending a message in an existing chat
    ChatSend,
    /// Opening a new chat
    ChatCreate,
    /// Following another user
    Follow,
    /// Invoking the AI writing assistant
    AiAssist,
    /// Reading the post feed
    FeedRead,
    /// Reading the notification feed
    NotificationRead,
    /// Role administration (create/update)
    RoleAdmin,
}

impl ActionKind {
    /// String identifier for this action (used in counter keys).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostCreate => "post_create",
            Self::ChatSend => "chat_send",
            Self::ChatCreate => "chat_create",
            Self::Follow => "follow",
            Self::AiAssist => "ai_assist",
            Self::FeedRead => "feed_read",
            Self::NotificationRead => "notification_read",
            Self::RoleAdmin => "role_admin",
        }
    }

    /// All action kinds, in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PostCreate,
            Self::ChatSend,
            Self::ChatCreate,
            Self::Follow,
            Self::AiAssist,
            Self::FeedRead,
            Self::NotificationRead,
            Self::RoleAdmin,
        ]
    }
}

/// Identifies one sliding quota window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuotaKey {
    /// The acting subject.
    pub subject: Uuid,
    /// The limited action kind.
    pub action: ActionKind,
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct QuotaDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Maximum requests allowed in the window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Seconds to wait before retrying (0 if allowed)
    pub retry_after: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_identifiers_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for action in ActionKind::all() {
            assert!(seen.insert(action.as_str()), "{action:?} reuses an identifier");
        }
    }
}
