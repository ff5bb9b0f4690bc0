//! Shared test fixtures: an in-memory data store that counts writes, a
//! manually advanced clock, and gate builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use loam_access::pagination::Cursor;
use loam_access::permissions::{Permissions, RoleRecord, Tier, UserRecord};
use loam_access::ratelimit::{Clock, MemoryCounterStore, PolicyTable, RateLimiter};
use loam_access::store::{DataStore, NotificationRecord, PostRecord};
use loam_access::AccessGate;

/// Clock advanced explicitly by tests.
#[derive(Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory stand-in for the external data store.
///
/// `writes` counts mutating calls so tests can assert that rejected
/// requests never reach the store.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
    roles: Mutex<HashMap<Uuid, RoleRecord>>,
    posts: Mutex<Vec<PostRecord>>,
    notifications: Mutex<Vec<NotificationRecord>>,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn seed_user(&self, permissions: Permissions, tier: Tier, role_ids: Vec<Uuid>) -> Uuid {
        self.seed_user_raw(&permissions.to_persisted(), tier, role_ids)
    }

    /// Seeds a user with an arbitrary raw permission string (possibly
    /// malformed, for fail-closed tests).
    pub fn seed_user_raw(&self, permissions: &str, tier: Tier, role_ids: Vec<Uuid>) -> Uuid {
        let id = Uuid::now_v7();
        self.users.lock().unwrap().insert(
            id,
            UserRecord {
                id,
                permissions: permissions.to_string(),
                role_ids,
                tier,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Assigns an existing role to an existing user.
    pub fn grant_role(&self, user_id: Uuid, role_id: Uuid) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&user_id) {
            user.role_ids.push(role_id);
        }
    }

    pub fn seed_role(&self, name: &str, permissions: Permissions) -> RoleRecord {
        let role = RoleRecord {
            id: Uuid::now_v7(),
            name: name.to_string(),
            permissions: permissions.to_persisted(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.roles.lock().unwrap().insert(role.id, role.clone());
        role
    }

    /// Seeds a post at an explicit whole-second timestamp.
    pub fn seed_post(&self, author_id: Uuid, body: &str, at_unix: i64) -> PostRecord {
        let post = PostRecord {
            id: Uuid::now_v7(),
            author_id,
            body: body.to_string(),
            created_at: Utc.timestamp_opt(at_unix, 0).unwrap(),
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }

    pub fn seed_notification(&self, user_id: Uuid, body: &str, at_unix: i64) -> NotificationRecord {
        let notification = NotificationRecord {
            id: Uuid::now_v7(),
            user_id,
            body: body.to_string(),
            created_at: Utc.timestamp_opt(at_unix, 0).unwrap(),
        };
        self.notifications.lock().unwrap().push(notification.clone());
        notification
    }
}

fn position<T: loam_access::pagination::PageItem>(row: &T) -> (DateTime<Utc>, Uuid) {
    (row.ordering_key(), row.id())
}

fn page_after<T: loam_access::pagination::PageItem + Clone>(
    rows: &[T],
    after: Option<&Cursor>,
    limit: usize,
) -> Vec<T> {
    let mut ordered: Vec<T> = rows.to_vec();
    ordered.sort_by(|a, b| position(b).cmp(&position(a)));
    ordered
        .into_iter()
        .filter(|row| after.map_or(true, |c| position(row) < (c.last_key, c.last_id)))
        .take(limit)
        .collect()
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_roles_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<RoleRecord>> {
        let roles = self.roles.lock().unwrap();
        Ok(ids.iter().filter_map(|id| roles.get(id).cloned()).collect())
    }

    async fn find_role_by_name(&self, name: &str) -> anyhow::Result<Option<RoleRecord>> {
        let roles = self.roles.lock().unwrap();
        Ok(roles.values().find(|r| r.name == name).cloned())
    }

    async fn create_role(
        &self,
        name: &str,
        permissions: Permissions,
    ) -> anyhow::Result<RoleRecord> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let role = RoleRecord {
            id: Uuid::now_v7(),
            name: name.to_string(),
            permissions: permissions.to_persisted(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.roles.lock().unwrap().insert(role.id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, id: Uuid, permissions: Permissions) -> anyhow::Result<RoleRecord> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut roles = self.roles.lock().unwrap();
        let role = roles
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("role {id} not found"))?;
        role.permissions = permissions.to_persisted();
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn create_post(&self, author_id: Uuid, body: &str) -> anyhow::Result<PostRecord> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let post = PostRecord {
            id: Uuid::now_v7(),
            author_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn posts_after(
        &self,
        after: Option<&Cursor>,
        limit: usize,
    ) -> anyhow::Result<Vec<PostRecord>> {
        Ok(page_after(&self.posts.lock().unwrap(), after, limit))
    }

    async fn notifications_after(
        &self,
        user_id: Uuid,
        after: Option<&Cursor>,
        limit: usize,
    ) -> anyhow::Result<Vec<NotificationRecord>> {
        let rows: Vec<NotificationRecord> = self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_after(&rows, after, limit))
    }
}

pub type TestGate = AccessGate<MemoryStore, MemoryCounterStore<ManualClock>>;

/// Installs a log subscriber once so `RUST_LOG=debug cargo test` shows
/// gate and limiter spans. Repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a gate over fresh fixtures with the default policy table.
pub fn gate(store: Arc<MemoryStore>, clock: ManualClock) -> TestGate {
    gate_with_policies(store, clock, PolicyTable::default())
}

pub fn gate_with_policies(
    store: Arc<MemoryStore>,
    clock: ManualClock,
    policies: PolicyTable,
) -> TestGate {
    init_tracing();
    let counters = Arc::new(MemoryCounterStore::with_clock(clock));
    AccessGate::new(store, RateLimiter::new(counters, policies))
}
