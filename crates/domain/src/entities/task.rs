//! Task - checklist item of one stage of a project

use crate::catalog::{Stage, TaskTemplate};
use crate::entities::{Project, ProjectId, UserId};
use crate::errors::DomainError;
use crate::value_objects::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type TaskId = Uuid;

/// Completion state of a checklist item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn from_completed(completed: bool) -> Self {
        if completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub stage: Stage,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub required_role: Role,
    pub assignee_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materialize a catalog template, pending and assigned to the project owner
    pub fn from_template(
        project: &Project,
        stage: Stage,
        template: &TaskTemplate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id: project.id,
            stage,
            title: template.title.to_string(),
            description: template.description.to_string(),
            status: TaskStatus::Pending,
            required_role: template.required_role,
            assignee_id: project.owner_id.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
