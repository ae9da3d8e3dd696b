//! Auth collaborator seam
//!
//! The tracker only consumes the identifier of an already authenticated
//! user. How that identity was established stays outside this crate.

use crate::types::Session;

pub trait AuthProvider: Send + Sync {
    /// Session of the current user, `None` when nobody is signed in
    fn current_session(&self) -> Option<Session>;
}

/// Provider with a fixed identity, resolved once at startup
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    session: Option<Session>,
}

impl StaticAuth {
    pub fn new(user_id: Option<String>) -> Self {
        let session = user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .map(Session::new);
        Self { session }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl AuthProvider for StaticAuth {
    fn current_session(&self) -> Option<Session> {
        self.session.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_user_is_anonymous() {
        assert!(StaticAuth::new(Some("  ".into())).current_session().is_none());
        assert!(StaticAuth::new(None).current_session().is_none());
        assert!(StaticAuth::anonymous().current_session().is_none());
    }

    #[test]
    fn test_user_id_is_trimmed() {
        let session = StaticAuth::new(Some(" ada ".into()))
            .current_session()
            .unwrap();
        assert_eq!(session.user_id, "ada");
        assert_eq!(session.access_token, None);
    }
}
