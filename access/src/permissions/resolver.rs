//! Permission resolution logic.
//!
//! Computes the effective permission set of a user from direct grants and
//! assigned roles, and checks it against a required set.

use tracing::warn;

use super::flags::{MalformedPermission, Permissions};
use super::models::{RoleRecord, UserRecord};

/// Compute the effective permissions for a user.
///
/// Effective set = direct grants ∪ (∪ over the provided role records).
/// The role slice is expected to come from one logical read keyed by
/// `user.role_ids`; ids whose role was deleted concurrently are simply
/// absent from the slice, so effective permissions degrade gracefully
/// instead of failing resolution.
///
/// A persisted value that does not decode fails the whole resolution:
/// permission data is never silently defaulted.
pub fn resolve_effective(
    user: &UserRecord,
    roles: &[RoleRecord],
) -> Result<Permissions, MalformedPermission> {
    let mut effective = Permissions::from_persisted(&user.permissions).map_err(|e| {
        warn!(user_id = %user.id, "unreadable direct permission grant");
        e
    })?;

    for role in roles {
        effective |= Permissions::from_persisted(&role.permissions).map_err(|e| {
            warn!(role_id = %role.id, role_name = %role.name, "unreadable role permissions");
            e
        })?;
    }

    Ok(effective)
}

/// Check an effective set against a required set.
///
/// `Err` carries exactly the missing flags for diagnostics; callers surface
/// a generic forbidden to end users.
pub fn authorize(effective: Permissions, required: Permissions) -> Result<(), Permissions> {
    let missing = required - effective;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
