//! Role - permission level of a user inside a research group
//!
//! Pure domain value object independent of how grants are stored

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission levels, ordered by priority
///
/// `Advisor > Researcher > Student`. A user may hold several grants; the
/// effective role is always the highest one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Least privilege, also the fallback when no grant exists
    #[default]
    Student = 1,
    Researcher = 2,
    /// Can advance stages, review projects and manage grants
    Advisor = 3,
}

impl Role {
    /// Get canonical role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Researcher => "researcher",
            Role::Advisor => "advisor",
        }
    }

    /// Get priority (higher wins)
    pub fn priority(&self) -> u8 {
        *self as u8
    }

    /// Whether a holder of this role may act on something that requires `required`
    pub fn can_access(&self, required: Role) -> bool {
        *self >= required
    }

    pub fn is_advisor(&self) -> bool {
        *self == Role::Advisor
    }

    /// Parse from string representation, case-insensitive
    pub fn parse_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "researcher" => Ok(Role::Researcher),
            "advisor" => Ok(Role::Advisor),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }

    /// Get all roles in ascending priority
    pub fn all() -> [Role; 3] {
        [Role::Student, Role::Researcher, Role::Advisor]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse_str(s)
    }
}

/// Pick the effective role out of a set of grants
///
/// An empty set resolves to `Student`.
pub fn effective_role<I>(grants: I) -> Role
where
    I: IntoIterator<Item = Role>,
{
    grants.into_iter().max().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_priority_order() {
        assert!(Role::Advisor > Role::Researcher);
        assert!(Role::Researcher > Role::Student);
        assert_eq!(Role::Advisor.priority(), 3);
        assert_eq!(Role::Student.priority(), 1);
    }

    #[test]
    fn test_empty_grants_default_to_student() {
        assert_eq!(effective_role(Vec::new()), Role::Student);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Role::parse_str("Advisor").unwrap(), Role::Advisor);
        assert_eq!("RESEARCHER".parse::<Role>().unwrap(), Role::Researcher);
        assert!(matches!(
            Role::parse_str("Newcomer"),
            Err(DomainError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_can_access() {
        assert!(Role::Advisor.can_access(Role::Researcher));
        assert!(Role::Student.can_access(Role::Student));
        assert!(!Role::Student.can_access(Role::Advisor));
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop_oneof![
            Just(Role::Student),
            Just(Role::Researcher),
            Just(Role::Advisor),
        ]
    }

    proptest! {
        #[test]
        fn effective_role_is_highest_grant(grants in prop::collection::vec(any_role(), 0..8)) {
            let resolved = effective_role(grants.iter().copied());
            if grants.is_empty() {
                prop_assert_eq!(resolved, Role::Student);
            } else {
                prop_assert!(grants.contains(&resolved));
                prop_assert!(grants.iter().all(|g| g.priority() <= resolved.priority()));
            }
        }
    }
}
