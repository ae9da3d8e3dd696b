use domain::{DomainError, ErrorCategory};
use thiserror::Error;

/// Failure of a tracker operation
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No session: the caller should send the user to sign in
    #[error("not signed in")]
    Unauthenticated,

    /// Rejected by a business rule before or instead of a store write
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store could not be read or written
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// How a failure should be surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Redirect to sign-in, not an error
    AuthenticationAbsent,
    /// Dismissible notification, operation abandoned
    StoreFailure,
    /// Disabled control or silent no-op
    DomainRule,
    /// Referenced row does not exist
    NotFound,
}

impl TrackerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TrackerError::Unauthenticated => FailureKind::AuthenticationAbsent,
            TrackerError::Storage(_) => FailureKind::StoreFailure,
            TrackerError::Domain(err) => match err.category() {
                ErrorCategory::NotFound => FailureKind::NotFound,
                _ => FailureKind::DomainRule,
            },
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, TrackerError::Domain(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Stage;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            TrackerError::Unauthenticated.kind(),
            FailureKind::AuthenticationAbsent
        );
        assert_eq!(
            TrackerError::from(anyhow::anyhow!("disk full")).kind(),
            FailureKind::StoreFailure
        );
        assert_eq!(
            TrackerError::from(DomainError::AlreadyAtFinalStage(Stage::Final)).kind(),
            FailureKind::DomainRule
        );
        assert_eq!(
            TrackerError::from(DomainError::ProjectNotFound("x".into())).kind(),
            FailureKind::NotFound
        );
    }

    #[test]
    fn test_storage_message_keeps_context() {
        let err = anyhow::anyhow!("locked").context("Failed to advance stage");
        let message = TrackerError::from(err).to_string();
        assert!(message.contains("Failed to advance stage"));
        assert!(message.contains("locked"));
    }
}
