//! Project - one deliverable of a research project
//!
//! A "research project" as users see it is a family of sibling projects,
//! one per deliverable kind, sharing the title prefix before `" - "`.

use crate::catalog::{DeliverableKind, Stage};
use crate::entities::UserId;
use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type ProjectId = Uuid;

/// Separator between the family title and the kind label
pub const TITLE_SEPARATOR: &str = " - ";

/// Review lifecycle of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    PendingReview,
    Approved,
    ChangesRequested,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::PendingReview => "pending_review",
            ProjectStatus::Approved => "approved",
            ProjectStatus::ChangesRequested => "changes_requested",
        }
    }

    /// Whether a transition to `next` is a legal review step
    pub fn can_transition_to(&self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Draft | ChangesRequested | Approved, PendingReview)
                | (PendingReview, Approved | ChangesRequested)
        )
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "pending_review" => Ok(ProjectStatus::PendingReview),
            "approved" => Ok(ProjectStatus::Approved),
            "changes_requested" => Ok(ProjectStatus::ChangesRequested),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

/// One deliverable, progressing through its kind's stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub owner_id: UserId,
    pub kind: DeliverableKind,
    pub stage: Stage,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Plan the sibling projects of a new research project, one per kind
    ///
    /// Each starts at its kind's first stage with status `draft`.
    pub fn family(
        title: &str,
        description: &str,
        owner_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<Project>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        if description.trim().is_empty() {
            return Err(DomainError::EmptyContent);
        }

        Ok(DeliverableKind::ALL
            .iter()
            .map(|kind| Project {
                id: Uuid::new_v4(),
                title: format!("{title}{TITLE_SEPARATOR}{}", kind.label()),
                description: description.to_string(),
                owner_id: owner_id.to_string(),
                kind: *kind,
                stage: kind.first_stage(),
                status: ProjectStatus::Draft,
                created_at: now,
                updated_at: now,
            })
            .collect())
    }

    /// Family title: everything before the first `" - "`
    pub fn title_prefix(&self) -> &str {
        title_prefix(&self.title)
    }

    pub fn is_at_final_stage(&self) -> bool {
        self.stage == self.kind.final_stage()
    }
}

pub fn title_prefix(title: &str) -> &str {
    title
        .split_once(TITLE_SEPARATOR)
        .map_or(title, |(prefix, _)| prefix)
}

/// Presentational grouping of sibling projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectGroup {
    pub title: String,
    pub description: String,
    pub projects: Vec<Project>,
}

/// Completion of a project's checklist across all seeded stages
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

impl ProjectProgress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}
