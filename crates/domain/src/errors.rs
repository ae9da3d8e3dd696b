//! Domain Errors - Business rule violations
//!
//! Contains ONLY business logic errors, never storage or transport failures.

use crate::catalog::{DeliverableKind, Stage};
use crate::entities::ProjectStatus;
use crate::value_objects::Role;
use thiserror::Error;

/// Domain-specific errors representing business rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Business validation: update content cannot be empty
    #[error("Content cannot be empty")]
    EmptyContent,

    /// Business validation: project title cannot be empty
    #[error("Project title cannot be empty")]
    EmptyTitle,

    /// Business validation: rating outside 1..=5
    #[error("Invalid rating: {0}, must be between 1 and 5")]
    InvalidRating(i64),

    /// Business validation: unknown role name
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Business validation: unknown deliverable kind
    #[error("Invalid deliverable kind: {0}")]
    InvalidKind(String),

    /// Business validation: unknown stage name
    #[error("Invalid stage: {0}")]
    InvalidStage(String),

    /// Business validation: unknown task or project status
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Business validation: unknown achievement type
    #[error("Invalid achievement type: {0}")]
    InvalidAchievement(String),

    /// Business rule: a project's stage must belong to its kind's sequence
    #[error("Stage {stage} is not part of the {kind} sequence")]
    StageNotInSequence { kind: DeliverableKind, stage: Stage },

    /// Business rule: the terminal stage has no successor
    #[error("Already at final stage ({0})")]
    AlreadyAtFinalStage(Stage),

    /// Business rule: every task of the active stage must be completed first
    #[error("Stage {stage} still has {remaining} open task(s)")]
    StageIncomplete { stage: Stage, remaining: usize },

    /// Business rule: only tasks of the active stage can be toggled
    #[error("Task belongs to stage {task_stage}, but the project is at {active_stage}")]
    StageNotActive { task_stage: Stage, active_stage: Stage },

    /// Business rule: checklist item requires a higher role
    #[error("Requires {required} role, caller is {actual}")]
    RoleTooLow { required: Role, actual: Role },

    /// Business rule: operation restricted to a role
    #[error("Operation {operation} requires the {required} role")]
    NotAuthorized {
        operation: &'static str,
        required: Role,
    },

    /// Business rule: operation restricted to the project owner
    #[error("Only the project owner can {operation}")]
    NotOwner { operation: &'static str },

    /// Business rule: review status cannot move this way
    #[error("Project status cannot change from {from} to {to}")]
    InvalidStatusTransition {
        from: ProjectStatus,
        to: ProjectStatus,
    },

    /// Business validation: project not found
    #[error("Project not found with ID: {0}")]
    ProjectNotFound(String),

    /// Business validation: task not found
    #[error("Task not found with ID: {0}")]
    TaskNotFound(String),

    /// Business validation: weekly update not found
    #[error("Update not found with ID: {0}")]
    UpdateNotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Check if error is a business validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyContent
                | DomainError::EmptyTitle
                | DomainError::InvalidRating(_)
                | DomainError::InvalidRole(_)
                | DomainError::InvalidKind(_)
                | DomainError::InvalidStage(_)
                | DomainError::InvalidStatus(_)
                | DomainError::InvalidAchievement(_)
        )
    }

    /// Check if error is a business rule violation
    pub fn is_business_rule_error(&self) -> bool {
        matches!(
            self,
            DomainError::StageNotInSequence { .. }
                | DomainError::AlreadyAtFinalStage(_)
                | DomainError::StageIncomplete { .. }
                | DomainError::StageNotActive { .. }
                | DomainError::InvalidStatusTransition { .. }
        )
    }

    /// Check if error is caused by the caller's role
    pub fn is_authorization_error(&self) -> bool {
        matches!(
            self,
            DomainError::RoleTooLow { .. }
                | DomainError::NotAuthorized { .. }
                | DomainError::NotOwner { .. }
        )
    }

    /// Check if error indicates missing data
    pub fn is_not_found_error(&self) -> bool {
        matches!(
            self,
            DomainError::ProjectNotFound(_)
                | DomainError::TaskNotFound(_)
                | DomainError::UpdateNotFound(_)
        )
    }

    /// Get error category for business logic
    pub fn category(&self) -> ErrorCategory {
        if self.is_validation_error() {
            ErrorCategory::Validation
        } else if self.is_business_rule_error() {
            ErrorCategory::BusinessRule
        } else if self.is_authorization_error() {
            ErrorCategory::Authorization
        } else {
            ErrorCategory::NotFound
        }
    }
}

/// Categories of domain errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input validation errors
    Validation,
    /// Business rule violations
    BusinessRule,
    /// Caller lacks the role for the operation
    Authorization,
    /// Resource not found
    NotFound,
}
