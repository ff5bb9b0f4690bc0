//! Records owned by the external data store.
//!
//! Permission values arrive as raw strings and are only decoded at the core
//! boundary; see [`super::Permissions::from_persisted`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription tier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Free account.
    Regular,
    /// Paying subscriber; may receive more quota headroom, never less.
    Premium,
}

/// Role with a named permission set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: Uuid,
    pub name: String,
    /// Raw persisted permission value (decimal bitfield string).
    pub permissions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User account as the store hands it over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    /// Raw persisted direct-grant value (decimal bitfield string).
    pub permissions: String,
    /// Assigned role ids. Referenced roles may be deleted concurrently;
    /// resolution skips ids with no matching record.
    pub role_ids: Vec<Uuid>,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}
