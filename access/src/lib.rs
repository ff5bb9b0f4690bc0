//! Loam Access Core
//!
//! Access-control and traffic-shaping core of the Loam social platform:
//! bitmask RBAC with per-user grants and a premium tier, tiered
//! action-scoped rate limiting over an atomic counter store, and
//! cursor-based pagination for stable feeds under concurrent writes.
//! Storage, identity, billing, and transport are external collaborators;
//! this crate decides who may do what, how often, and hands back bounded
//! pages.

pub mod gate;
pub mod pagination;
pub mod permissions;
pub mod ratelimit;
pub mod store;

pub use gate::{AccessError, AccessGate, Caller};
