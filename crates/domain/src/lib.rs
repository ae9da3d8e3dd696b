//! Domain Layer - research tracker business rules
//!
//! Pure logic only: no database, no terminal, no clock of its own. Callers
//! pass timestamps and identities in explicitly.
//!
//! - Catalog: deliverable kinds, stage sequences, checklist templates
//! - Entities: users, projects, tasks, weekly updates, achievements
//! - Value Objects: roles and ratings
//! - Services: stage progression, project grouping, achievement merge

pub mod catalog;
pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use catalog::{tasks_for, DeliverableKind, Stage, TaskTemplate};
pub use entities::{
    AchievementDefinition, AchievementKind, AchievementView, EarnedAchievement, Project,
    ProjectGroup, ProjectId, ProjectProgress, ProjectStatus, Rating, RoleGrant, Task, TaskId,
    TaskStatus, UpdateId, User, UserId, WeeklyUpdate, ACHIEVEMENT_CATALOG,
};
pub use errors::{DomainError, DomainResult, ErrorCategory};
pub use repositories::RoleGrantSource;
pub use services::{group_by_title_prefix, merge_achievements, total_points, StageChecklist};
pub use value_objects::{effective_role, RatingValue, Role};
