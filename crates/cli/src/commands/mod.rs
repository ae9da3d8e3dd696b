pub mod achievements;
pub mod auth;
pub mod catalog;
pub mod progress;
pub mod project;
pub mod role;
pub mod update;

pub use achievements::AchievementsCommand;
pub use auth::LoginCommand;
pub use catalog::CatalogCommand;
pub use progress::{AdvanceCommand, TaskCommand, TasksCommand};
pub use project::ProjectCommand;
pub use role::RoleCommand;
pub use update::UpdateCommand;
