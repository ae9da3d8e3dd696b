//! Stage progression rules
//!
//! Pure state machine over a kind's stage sequence plus the checks that
//! gate toggling and advancing. Storage is the caller's business.

use crate::catalog::{tasks_for, Stage};
use crate::entities::{Project, ProjectStatus, Task};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stage following `project.stage` in its kind's sequence
pub fn next_stage(project: &Project) -> DomainResult<Stage> {
    let stages = project.kind.stages();
    let index = project.kind.stage_index(project.stage)?;
    stages
        .get(index + 1)
        .copied()
        .ok_or(DomainError::AlreadyAtFinalStage(project.stage))
}

/// Tasks to insert when `stage` of the project is viewed for the first time
///
/// A stage outside the project's sequence has no plan.
pub fn seed_plan(project: &Project, stage: Stage, now: DateTime<Utc>) -> Vec<Task> {
    tasks_for(project.kind, stage)
        .iter()
        .map(|template| Task::from_template(project, stage, template, now))
        .collect()
}

/// Fails unless every task of `stage` is completed
///
/// A stage without tasks counts as complete.
pub fn ensure_stage_complete(stage: Stage, tasks: &[Task]) -> DomainResult<()> {
    let remaining = tasks
        .iter()
        .filter(|t| t.stage == stage && !t.is_completed())
        .count();
    if remaining > 0 {
        return Err(DomainError::StageIncomplete { stage, remaining });
    }
    Ok(())
}

/// Toggling is limited to the active stage and to callers holding the
/// item's required role
pub fn check_toggle(project: &Project, task: &Task, role: Role) -> DomainResult<()> {
    if task.stage != project.stage {
        return Err(DomainError::StageNotActive {
            task_stage: task.stage,
            active_stage: project.stage,
        });
    }
    if !role.can_access(task.required_role) {
        return Err(DomainError::RoleTooLow {
            required: task.required_role,
            actual: role,
        });
    }
    Ok(())
}

/// Validate an advance and return the target stage
pub fn check_advance(project: &Project, role: Role, tasks: &[Task]) -> DomainResult<Stage> {
    let next = next_stage(project)?;
    if !role.is_advisor() {
        return Err(DomainError::NotAuthorized {
            operation: "advance_stage",
            required: Role::Advisor,
        });
    }
    ensure_stage_complete(project.stage, tasks)?;
    Ok(next)
}

/// Only the owner requests review, once the active stage is done
pub fn check_review_request(project: &Project, caller_id: &str, tasks: &[Task]) -> DomainResult<()> {
    if project.owner_id != caller_id {
        return Err(DomainError::NotOwner {
            operation: "request review",
        });
    }
    ensure_stage_complete(project.stage, tasks)?;
    ensure_transition(project.status, ProjectStatus::PendingReview)
}

pub fn check_review_decision(
    project: &Project,
    role: Role,
    decision: ProjectStatus,
) -> DomainResult<()> {
    if !role.is_advisor() {
        return Err(DomainError::NotAuthorized {
            operation: "review_project",
            required: Role::Advisor,
        });
    }
    ensure_transition(project.status, decision)
}

fn ensure_transition(from: ProjectStatus, to: ProjectStatus) -> DomainResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(DomainError::InvalidStatusTransition { from, to })
    }
}

/// A checklist entry as shown to one viewer
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItem {
    pub task: Task,
    /// Viewer's role is below the item's required role
    pub locked: bool,
}

/// Active-stage checklist of a project for one viewer
#[derive(Debug, Clone, Serialize)]
pub struct StageChecklist {
    pub project: Project,
    pub stage: Stage,
    pub items: Vec<ChecklistItem>,
    pub all_completed: bool,
    pub can_advance: bool,
}

impl StageChecklist {
    pub fn build(project: Project, tasks: Vec<Task>, viewer_role: Role) -> Self {
        let stage = project.stage;
        let all_completed = ensure_stage_complete(stage, &tasks).is_ok();
        let can_advance = check_advance(&project, viewer_role, &tasks).is_ok();
        let items = tasks
            .into_iter()
            .filter(|t| t.stage == stage)
            .map(|task| ChecklistItem {
                locked: !viewer_role.can_access(task.required_role),
                task,
            })
            .collect();

        Self {
            project,
            stage,
            items,
            all_completed,
            can_advance,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.task.is_completed()).count()
    }
}
