//! Permission system types and utilities.
//!
//! Bitmask-based RBAC: a user's effective permission set is the union of
//! their direct grants and the grants of every assigned role. Persisted
//! permission values are decoded once at the storage boundary.

pub mod flags;
pub mod models;
pub mod resolver;

pub use flags::{MalformedPermission, Permissions};
pub use models::{RoleRecord, Tier, UserRecord};
pub use resolver::{authorize, resolve_effective};
