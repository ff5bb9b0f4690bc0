//! The access gate: the single call every mutating or feed-reading
//! endpoint makes before touching storage.
//!
//! Sequence, cheapest and most-likely-to-reject first: resolve the
//! caller's effective permissions, check and consume a quota slot, only
//! then invoke the data-store operation. A forbidden caller never consumes
//! quota; a forbidden or rate-limited caller never reaches the store.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::pagination::{build_page, Cursor, CursorError, Page, PageItem, PageRequest};
use crate::permissions::{
    authorize, resolve_effective, MalformedPermission, Permissions, RoleRecord, Tier,
};
use crate::ratelimit::{ActionKind, CounterStore, QuotaError, RateLimiter};
use crate::store::{DataStore, NotificationRecord, PostRecord};

/// Expected outcomes and collaborator faults of a gated operation.
///
/// The first six variants are local, expected outcomes; `Quota` and
/// `Store` wrap collaborator faults and propagate unchanged to the
/// transport layer.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Caller lacks one or more required permission flags. The missing
    /// flags are diagnostics only; surface a generic forbidden to users.
    #[error("caller lacks required permissions")]
    Forbidden { missing: Permissions },

    /// Caller exceeded the quota for this action; retryable after the
    /// given number of seconds.
    #[error("rate limited; retry after {retry_after}s")]
    RateLimited { retry_after: u64, limit: u32 },

    /// Malformed or stale pagination token; restart the scan.
    #[error(transparent)]
    InvalidCursor(#[from] CursorError),

    /// Persisted permission data is unreadable (data-integrity fault,
    /// fails closed).
    #[error(transparent)]
    MalformedPermission(#[from] MalformedPermission),

    /// No user record for the authenticated subject id.
    #[error("unknown subject {0}")]
    UnknownSubject(Uuid),

    /// A role with this name already exists.
    #[error("role {0:?} already exists")]
    DuplicateRole(String),

    /// The quota counter store is unreachable.
    #[error(transparent)]
    Quota(#[from] QuotaError),

    /// The data store failed.
    #[error("data store failure")]
    Store(#[from] anyhow::Error),
}

/// A resolved caller: effective permissions plus tier.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: Uuid,
    pub tier: Tier,
    pub effective: Permissions,
}

/// Façade over role resolution, rate limiting, and feed pagination.
///
/// Constructed once at process start with handles to the collaborators;
/// request handlers share it by reference.
pub struct AccessGate<D, C> {
    store: Arc<D>,
    limiter: RateLimiter<C>,
}

impl<D: DataStore, C: CounterStore> AccessGate<D, C> {
    pub fn new(store: Arc<D>, limiter: RateLimiter<C>) -> Self {
        Self { store, limiter }
    }

    /// Resolves the caller's effective permission set from one consistent
    /// snapshot read of their user and role records.
    async fn resolve_caller(&self, subject: Uuid) -> Result<Caller, AccessError> {
        let user = self
            .store
            .find_user(subject)
            .await?
            .ok_or(AccessError::UnknownSubject(subject))?;

        // Single read over all assigned role ids; concurrently deleted
        // roles are absent from the result and thus skipped.
        let roles = self.store.find_roles_by_ids(&user.role_ids).await?;
        let effective = resolve_effective(&user, &roles)?;

        Ok(Caller {
            id: user.id,
            tier: user.tier,
            effective,
        })
    }

    /// Runs the permission and quota checks for one logical attempt.
    ///
    /// Permission rejection happens before the quota check, so a forbidden
    /// attempt is never charged; each allowed attempt is charged exactly
    /// once.
    #[tracing::instrument(skip(self), fields(action = %action.as_str()))]
    pub async fn authorize_action(
        &self,
        subject: Uuid,
        action: ActionKind,
        required: Permissions,
    ) -> Result<Caller, AccessError> {
        let caller = self.resolve_caller(subject).await?;

        if let Err(missing) = authorize(caller.effective, required) {
            debug!(subject = %subject, missing = ?missing, "permission denied");
            return Err(AccessError::Forbidden { missing });
        }

        let decision = self.limiter.check(caller.id, action, caller.tier).await?;
        if !decision.allowed {
            return Err(AccessError::RateLimited {
                retry_after: decision.retry_after,
                limit: decision.limit,
            });
        }

        Ok(caller)
    }

    /// Gates an arbitrary mutating store operation.
    ///
    /// `op` runs only after the permission and quota checks pass; its
    /// failure is a store fault, not an access outcome, and the quota
    /// charge is not refunded.
    pub async fn perform<T, Fut>(
        &self,
        subject: Uuid,
        action: ActionKind,
        required: Permissions,
        op: impl FnOnce(Caller) -> Fut + Send,
    ) -> Result<T, AccessError>
    where
        Fut: Future<Output = anyhow::Result<T>> + Send,
    {
        let caller = self.authorize_action(subject, action, required).await?;
        Ok(op(caller).await?)
    }

    /// Gates an ordered feed read and assembles the page.
    ///
    /// The cursor is decoded before anything else: a garbage token is the
    /// cheapest rejection and must not consume a quota slot.
    pub async fn read_page<T, Fut>(
        &self,
        subject: Uuid,
        action: ActionKind,
        required: Permissions,
        request: &PageRequest,
        fetch: impl FnOnce(Option<Cursor>, usize) -> Fut + Send,
    ) -> Result<Page<T>, AccessError>
    where
        T: PageItem,
        Fut: Future<Output = anyhow::Result<Vec<T>>> + Send,
    {
        let after = request.cursor.as_deref().map(Cursor::decode).transpose()?;

        self.authorize_action(subject, action, required).await?;

        let limit = request.effective_limit();
        let rows = fetch(after, limit + 1).await?;
        Ok(build_page(rows, limit))
    }

    // === Concrete operations ===

    /// Creates a role. Requires `MANAGE_ROLES`; callers cannot grant flags
    /// they do not hold themselves.
    pub async fn create_role(
        &self,
        subject: Uuid,
        name: &str,
        permissions: Permissions,
    ) -> Result<RoleRecord, AccessError> {
        let caller = self
            .authorize_action(subject, ActionKind::RoleAdmin, Permissions::MANAGE_ROLES)
            .await?;
        ensure_grantable(caller.effective, permissions)?;

        if self.store.find_role_by_name(name).await?.is_some() {
            return Err(AccessError::DuplicateRole(name.to_string()));
        }

        let role = self.store.create_role(name, permissions).await?;
        info!(role_id = %role.id, role_name = %role.name, actor = %subject, "role created");
        Ok(role)
    }

    /// Replaces a role's permission set. Same guards as [`Self::create_role`].
    pub async fn update_role(
        &self,
        subject: Uuid,
        role_id: Uuid,
        permissions: Permissions,
    ) -> Result<RoleRecord, AccessError> {
        let caller = self
            .authorize_action(subject, ActionKind::RoleAdmin, Permissions::MANAGE_ROLES)
            .await?;
        ensure_grantable(caller.effective, permissions)?;

        let role = self.store.update_role(role_id, permissions).await?;
        info!(role_id = %role.id, actor = %subject, "role updated");
        Ok(role)
    }

    /// Publishes a post authored by the subject.
    pub async fn create_post(&self, subject: Uuid, body: &str) -> Result<PostRecord, AccessError> {
        self.perform(
            subject,
            ActionKind::PostCreate,
            Permissions::CREATE_POSTS,
            |caller| async move { self.store.create_post(caller.id, body).await },
        )
        .await
    }

    /// Reads one page of the post feed.
    pub async fn post_feed(
        &self,
        subject: Uuid,
        request: &PageRequest,
    ) -> Result<Page<PostRecord>, AccessError> {
        self.read_page(
            subject,
            ActionKind::FeedRead,
            Permissions::READ_FEED,
            request,
            |after, probe| async move { self.store.posts_after(after.as_ref(), probe).await },
        )
        .await
    }

    /// Reads one page of the subject's notification feed.
    pub async fn notifications(
        &self,
        subject: Uuid,
        request: &PageRequest,
    ) -> Result<Page<NotificationRecord>, AccessError> {
        self.read_page(
            subject,
            ActionKind::NotificationRead,
            Permissions::READ_FEED,
            request,
            |after, probe| async move {
                self.store
                    .notifications_after(subject, after.as_ref(), probe)
                    .await
            },
        )
        .await
    }
}

/// Rejects grants of flags the actor does not hold (escalation guard).
fn ensure_grantable(actor: Permissions, granted: Permissions) -> Result<(), AccessError> {
    let escalation = granted - actor;
    if escalation.is_empty() {
        Ok(())
    } else {
        Err(AccessError::Forbidden { missing: escalation })
    }
}
