//! External data-store collaborator seam.
//!
//! The core never owns user/role/post persistence; it consumes this trait.
//! Store faults are unexpected failures and propagate unchanged as
//! [`anyhow::Error`] — expected access-control outcomes never originate
//! here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::{Cursor, PageItem};
use crate::permissions::{Permissions, RoleRecord, UserRecord};

/// A published post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl PageItem for PostRecord {
    fn id(&self) -> Uuid {
        self.id
    }
    fn ordering_key(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A notification addressed to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl PageItem for NotificationRecord {
    fn id(&self) -> Uuid {
        self.id
    }
    fn ordering_key(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Operations the core consumes from the data store.
///
/// Reads named `*_after` return up to `limit` rows ordered
/// `(created_at desc, id desc)`, starting strictly after the cursor
/// position when one is given. `find_roles_by_ids` must be one logical
/// read so role resolution sees a consistent snapshot; ids with no
/// matching record are omitted, not errors.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>>;

    async fn find_roles_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<RoleRecord>>;

    async fn find_role_by_name(&self, name: &str) -> anyhow::Result<Option<RoleRecord>>;

    async fn create_role(&self, name: &str, permissions: Permissions)
        -> anyhow::Result<RoleRecord>;

    async fn update_role(&self, id: Uuid, permissions: Permissions)
        -> anyhow::Result<RoleRecord>;

    async fn create_post(&self, author_id: Uuid, body: &str) -> anyhow::Result<PostRecord>;

    async fn posts_after(
        &self,
        after: Option<&Cursor>,
        limit: usize,
    ) -> anyhow::Result<Vec<PostRecord>>;

    async fn notifications_after(
        &self,
        user_id: Uuid,
        after: Option<&Cursor>,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationRecord>>;
}
