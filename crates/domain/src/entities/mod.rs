//! Domain Entities - Core business objects
//!
//! Entities carry identity and business rules, independent of storage.

pub mod achievement;
pub mod project;
pub mod task;
pub mod update;
pub mod user;

pub use achievement::{
    AchievementDefinition, AchievementKind, AchievementView, EarnedAchievement,
    ACHIEVEMENT_CATALOG,
};
pub use project::{
    title_prefix, Project, ProjectGroup, ProjectId, ProjectProgress, ProjectStatus,
    TITLE_SEPARATOR,
};
pub use task::{Task, TaskId, TaskStatus};
pub use update::{Rating, UpdateId, WeeklyUpdate};
pub use user::{RoleGrant, User, UserId};
