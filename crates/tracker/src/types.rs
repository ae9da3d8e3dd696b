use domain::{AchievementKind, ProjectId, ProjectStatus, Stage, TaskId, UpdateId, UserId};
use serde::{Deserialize, Serialize};

/// Authenticated identity, passed explicitly into every operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub access_token: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: None,
        }
    }
}

/// State changes published to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerEvent {
    ProjectCreated {
        title: String,
        project_ids: Vec<ProjectId>,
    },
    TasksSeeded {
        project_id: ProjectId,
        stage: Stage,
        count: usize,
    },
    TaskToggled {
        task_id: TaskId,
        completed: bool,
        by: UserId,
    },
    StageAdvanced {
        project_id: ProjectId,
        from: Stage,
        to: Stage,
    },
    StatusChanged {
        project_id: ProjectId,
        from: ProjectStatus,
        to: ProjectStatus,
    },
    UpdatePosted {
        update_id: UpdateId,
        author_id: UserId,
    },
    UpdateRated {
        update_id: UpdateId,
        rater_id: UserId,
        value: u8,
    },
    AchievementAwarded {
        user_id: UserId,
        kind: AchievementKind,
    },
}
