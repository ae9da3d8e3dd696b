use crate::util;
use anyhow::{Context, Result};
use common::TrackerConfig;
use domain::Role;
use std::path::Path;
use tracker::{AuthProvider, Session, StaticAuth, TrackerError, TrackerResult, TrackerService};

/// Everything a command needs: the service and who is calling
pub struct AppContext {
    pub service: TrackerService,
    pub auth: StaticAuth,
}

impl AppContext {
    pub async fn open(config: TrackerConfig, home: &Path) -> Result<Self> {
        let db_path = config.database_path(home);
        util::ensure_parent_dir(&db_path)?;

        let default_role = Role::parse_str(&config.auth.default_role)
            .context("Invalid auth.default_role in configuration")?;
        let service = tracker::create_service(&db_path, config.database.pool_size)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?
            .with_default_role(default_role);
        let auth = StaticAuth::new(config.auth.user.clone());

        Ok(Self { service, auth })
    }

    pub fn current_session(&self) -> Option<Session> {
        self.auth.current_session()
    }

    /// Session or `Unauthenticated`
    pub fn session(&self) -> TrackerResult<Session> {
        self.current_session().ok_or(TrackerError::Unauthenticated)
    }

    /// `user`, falling back to the signed-in user
    pub fn target_user(&self, user: Option<String>) -> TrackerResult<String> {
        match user {
            Some(user) => Ok(user),
            None => Ok(self.session()?.user_id),
        }
    }
}
