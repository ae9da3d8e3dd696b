//! RoleGrantSource - read side of role grant persistence

use crate::entities::UserId;
use crate::value_objects::Role;
use async_trait::async_trait;

/// Source of a user's role grants
///
/// Failures are plain `anyhow` errors: callers resolving a role treat any
/// read failure as "no grants".
#[async_trait]
pub trait RoleGrantSource: Send + Sync {
    /// All roles granted to `user_id`, in no particular order
    async fn grants_for(&self, user_id: &UserId) -> anyhow::Result<Vec<Role>>;
}
