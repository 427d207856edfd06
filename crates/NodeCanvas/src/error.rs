//! # Errors
//!
//! Every fallible scene operation returns [`Result`]. Nothing in this crate panics on
//! bad input: a stale handle or a broken precondition is reported back to the caller,
//! who decides whether it matters.

use thiserror::Error;

use crate::model::EntityId;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors produced by [`Scene`](crate::scene::Scene) operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The handle does not refer to a live entity (never added, or already removed).
    #[error("entity {0:?} is not registered in the scene")]
    NotFound(EntityId),

    /// An arrow-only operation was called on a box.
    #[error("entity {0:?} is not an arrow")]
    NotAnArrow(EntityId),

    /// The entity has no local rectangle, so it cannot be anchored to or hit-tested as a box.
    #[error("entity {0:?} has no rectangle to anchor on")]
    MissingGeometry(EntityId),

    /// The subscription handle was never issued or was already removed.
    #[error("event subscription is not registered")]
    SubscriptionNotFound,
}
