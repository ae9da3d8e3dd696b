//! Research tracker storage and service layer
//!
//! `SqliteStore` persists users, role grants, projects, checklists, weekly
//! updates and earned achievements. `TrackerService` runs every operation
//! against it for an explicit `Session` and publishes `TrackerEvent`s.

use std::path::Path;

pub mod auth;
pub mod error;
pub mod roles;
pub mod service;
pub mod store;
pub mod types;

pub use auth::{AuthProvider, StaticAuth};
pub use error::{FailureKind, TrackerError, TrackerResult};
pub use roles::RoleResolver;
pub use service::{TrackerEventStream, TrackerService, EVENT_CHANNEL_CAPACITY};
pub use store::SqliteStore;
pub use types::{Session, TrackerEvent};

/// Open (or create) the database at `db_path` and build a service on it
///
/// # Example
/// ```no_run
/// use tracker::{create_service, Session};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let service = create_service("tracker.db", 4).await?;
///     let session = Session::new("ada");
///
///     service.sign_in(&session, Some("Ada")).await?;
///     let projects = service.create_project(&session, "Thesis", "Graph sparsifiers").await?;
///     let checklist = service.stage_checklist(&session, &projects[0].id).await?;
///     println!("{} items at {}", checklist.items.len(), checklist.stage);
///     Ok(())
/// }
/// ```
pub async fn create_service<P: AsRef<Path>>(
    db_path: P,
    pool_size: u32,
) -> anyhow::Result<TrackerService> {
    TrackerService::new(db_path, pool_size).await
}

pub async fn create_default_service<P: AsRef<Path>>(db_path: P) -> anyhow::Result<TrackerService> {
    create_service(db_path, 4).await
}
