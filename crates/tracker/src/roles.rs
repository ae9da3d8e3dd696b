use domain::{effective_role, Role, RoleGrantSource, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves a user's effective role from their grants
///
/// A failed read is not an error: it is logged and resolves to the least
/// privileged role, the same as a user without grants.
#[derive(Clone)]
pub struct RoleResolver {
    source: Arc<dyn RoleGrantSource>,
}

impl RoleResolver {
    pub fn new(source: Arc<dyn RoleGrantSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, user_id: &UserId) -> Role {
        match self.source.grants_for(user_id).await {
            Ok(grants) => {
                let role = effective_role(grants);
                debug!(user_id = %user_id, role = %role, "resolved role");
                role
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "role lookup failed, falling back to student");
                Role::Student
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedGrants(Vec<Role>);

    #[async_trait]
    impl RoleGrantSource for FixedGrants {
        async fn grants_for(&self, _user_id: &UserId) -> anyhow::Result<Vec<Role>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl RoleGrantSource for BrokenSource {
        async fn grants_for(&self, _user_id: &UserId) -> anyhow::Result<Vec<Role>> {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    #[tokio::test]
    async fn test_highest_grant_wins() {
        let resolver = RoleResolver::new(Arc::new(FixedGrants(vec![
            Role::Student,
            Role::Advisor,
            Role::Researcher,
        ])));
        assert_eq!(resolver.resolve(&"u1".to_string()).await, Role::Advisor);
    }

    #[tokio::test]
    async fn test_no_grants_is_student() {
        let resolver = RoleResolver::new(Arc::new(FixedGrants(Vec::new())));
        assert_eq!(resolver.resolve(&"u1".to_string()).await, Role::Student);
    }

    #[tokio::test]
    async fn test_read_failure_is_student() {
        let resolver = RoleResolver::new(Arc::new(BrokenSource));
        assert_eq!(resolver.resolve(&"u1".to_string()).await, Role::Student);
    }
}
