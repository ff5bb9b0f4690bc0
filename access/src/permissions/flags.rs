//! Platform permissions using bitflags.
//!
//! Permissions are organized into categories:
//! - Content (bits 0-2): Posting and chat permissions
//! - Social (bits 3-4): Graph and feed permissions
//! - Premium (bits 5-6): Subscription-gated features
//! - Moderation (bits 7-8): Content and member management
//! - Administration (bits 9-12): Platform-level permissions
//!
//! Bit positions are append-only. A shipped position is never reused, or
//! every persisted permission string decodes to the wrong set.

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Platform permissions represented as a 64-bit bitfield.
    ///
    /// Persisted as the decimal string form of the bits; see
    /// [`Permissions::from_persisted`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct Permissions: u64 {
        // === Content (bits 0-2) ===
        /// Permission to publish posts
        const CREATE_POSTS       = 1 << 0;
        /// Permission to send messages in existing chats
        const SEND_CHAT          = 1 << 1;
        /// Permission to open new chats
        const CREATE_CHATS       = 1 << 2;

        // === Social (bits 3-4) ===
        /// Permission to follow other users
        const FOLLOW_USERS       = 1 << 3;
        /// Permission to read the post and notification feeds
        const READ_FEED          = 1 << 4;

        // === Premium (bits 5-6) ===
        /// Permission to use the AI writing assistant
        const USE_AI_ASSIST      = 1 << 5;
        /// Permission to hide the verification badge on the own profile
        const HIDE_VERIFICATION  = 1 << 6;

        // === Moderation (bits 7-8) ===
        /// Permission to remove or restrict other members' posts
        const MODERATE_POSTS     = 1 << 7;
        /// Permission to suspend or restore member accounts
        const MANAGE_USERS       = 1 << 8;

        // === Administration (bits 9-12) ===
        /// Permission to create, edit, and assign roles
        const MANAGE_ROLES       = 1 << 9;
        /// Permission to view the platform audit log
        const VIEW_AUDIT_LOG     = 1 << 10;
        /// Permission to manage subscription and billing records
        const MANAGE_BILLING     = 1 << 11;
        /// Permission to send platform-wide notifications
        const SEND_NOTIFICATIONS = 1 << 12;
    }
}

/// A persisted permission value that does not decode to a bitmask.
///
/// Treated as a data-integrity fault: the request fails closed rather than
/// degrading the caller to zero (or all) permissions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("persisted permission value is not a non-negative integer")]
pub struct MalformedPermission;

impl Permissions {
    // === Preset Combinations ===

    /// Default permissions for a regular member account.
    pub const MEMBER_DEFAULT: Self = Self::CREATE_POSTS
        .union(Self::SEND_CHAT)
        .union(Self::CREATE_CHATS)
        .union(Self::FOLLOW_USERS)
        .union(Self::READ_FEED);

    /// Default permissions for a premium subscriber.
    pub const PREMIUM_DEFAULT: Self = Self::MEMBER_DEFAULT
        .union(Self::USE_AI_ASSIST)
        .union(Self::HIDE_VERIFICATION);

    /// Default permissions for moderators.
    pub const MODERATOR_DEFAULT: Self = Self::MEMBER_DEFAULT
        .union(Self::MODERATE_POSTS)
        .union(Self::MANAGE_USERS)
        .union(Self::VIEW_AUDIT_LOG);

    // === Storage Conversion ===

    /// Decode a persisted permission value.
    ///
    /// The store keeps permissions as the decimal string of the bitfield
    /// (a leftover of its document-store heritage). Anything that is not a
    /// non-negative integer is rejected with [`MalformedPermission`].
    /// Unknown bits are silently dropped to stay forward compatible with
    /// flags added by newer deployments.
    pub fn from_persisted(raw: &str) -> Result<Self, MalformedPermission> {
        let bits: u64 = raw.trim().parse().map_err(|_| MalformedPermission)?;
        Ok(Self::from_bits_truncate(bits))
    }

    /// Encode this permission set for storage.
    #[must_use]
    pub fn to_persisted(self) -> String {
        self.bits().to_string()
    }

    // === Permission Checking ===

    /// Check if this permission set includes the specified permission(s).
    ///
    /// When `permission` has several flags set, all of them must be present.
    #[must_use]
    pub const fn has(self, permission: Self) -> bool {
        self.contains(permission)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}
