use crate::value_objects::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier issued by the external auth provider
pub type UserId = String;

/// Profile of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Profile for a first sign-in; the display name falls back to the identifier
    pub fn new(id: impl Into<UserId>, display_name: Option<&str>, now: DateTime<Utc>) -> Self {
        let id = id.into();
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());
        Self {
            id,
            display_name,
            avatar_url: None,
            created_at: now,
        }
    }
}

/// A single (user, role) grant; a user may hold several
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub user_id: UserId,
    pub role: Role,
    pub granted_at: DateTime<Utc>,
}
