use crate::error::{TrackerError, TrackerResult};
use crate::roles::RoleResolver;
use crate::store::SqliteStore;
use crate::types::{Session, TrackerEvent};
use chrono::Utc;
use domain::services::progression;
use domain::{
    group_by_title_prefix, merge_achievements, AchievementKind, AchievementView, DomainError,
    Project, ProjectGroup, ProjectId, ProjectProgress, ProjectStatus, Rating, RatingValue, Role,
    RoleGrant, Stage, StageChecklist, Task, TaskId, TaskStatus, UpdateId, User, UserId,
    WeeklyUpdate,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Events buffered per subscriber before the slowest one starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Async facade over the tracker store
///
/// Every operation acting on behalf of a user takes the caller's `Session`
/// explicitly. Role and stage rules are checked here, before the write.
pub struct TrackerService {
    store: Arc<SqliteStore>,
    roles: RoleResolver,
    default_role: Role,
    events_tx: broadcast::Sender<TrackerEvent>,
}

impl TrackerService {
    pub async fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> anyhow::Result<Self> {
        let store = Arc::new(SqliteStore::new(db_path, pool_size).await?);
        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Arc<SqliteStore>) -> Self {
        let roles = RoleResolver::new(store.clone());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            store,
            roles,
            default_role: Role::Student,
            events_tx,
        }
    }

    /// Role granted on first sign-in
    pub fn with_default_role(mut self, role: Role) -> Self {
        self.default_role = role;
        self
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    // Users and roles

    /// Record the profile of a freshly authenticated user
    ///
    /// Grants the default role only when the user holds no grant yet.
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn sign_in(
        &self,
        session: &Session,
        display_name: Option<&str>,
    ) -> TrackerResult<User> {
        let now = Utc::now();
        let existing = self.store.get_user(&session.user_id).await?;
        let mut user = User::new(session.user_id.clone(), display_name, now);
        if let Some(existing) = existing {
            user.created_at = existing.created_at;
            if display_name.is_none() {
                user.display_name = existing.display_name;
            }
        }

        let user = self.store.upsert_user(&user).await?;
        let granted = self
            .store
            .grant_default_role_if_none(&user.id, self.default_role, now)
            .await?;
        if granted {
            info!(role = %self.default_role, "granted default role");
        }

        Ok(user)
    }

    pub async fn profile(&self, user_id: &str) -> TrackerResult<Option<User>> {
        Ok(self.store.get_user(user_id).await?)
    }

    /// Effective role; never fails
    pub async fn resolve_role(&self, user_id: &UserId) -> Role {
        self.roles.resolve(user_id).await
    }

    pub async fn role_grants(&self, user_id: &str) -> TrackerResult<Vec<RoleGrant>> {
        Ok(self.store.role_grants(user_id).await?)
    }

    /// Advisor-only; returns `false` if the grant already existed
    #[instrument(skip(self, session), fields(by = %session.user_id))]
    pub async fn grant_role(
        &self,
        session: &Session,
        user_id: &str,
        role: Role,
    ) -> TrackerResult<bool> {
        self.require_advisor(session, "grant_role").await?;
        let inserted = self.store.grant_role(user_id, role, Utc::now()).await?;
        if inserted {
            info!("granted {} to {}", role, user_id);
        }
        Ok(inserted)
    }

    // Projects

    /// Create one project per deliverable kind, all or nothing
    #[instrument(skip(self, session, description), fields(owner = %session.user_id))]
    pub async fn create_project(
        &self,
        session: &Session,
        title: &str,
        description: &str,
    ) -> TrackerResult<Vec<Project>> {
        let projects = Project::family(title, description, &session.user_id, Utc::now())?;
        self.store.insert_projects(&projects).await?;

        self.emit_event(TrackerEvent::ProjectCreated {
            title: title.trim().to_string(),
            project_ids: projects.iter().map(|p| p.id).collect(),
        });
        info!("created {} projects for '{}'", projects.len(), title.trim());
        Ok(projects)
    }

    /// Projects of the signed-in user grouped into research projects
    ///
    /// Without a session the list is empty.
    pub async fn list_projects(&self, session: Option<&Session>) -> TrackerResult<Vec<ProjectGroup>> {
        let Some(session) = session else {
            debug!("listing projects without a session");
            return Ok(Vec::new());
        };
        let projects = self.store.list_projects(&session.user_id).await?;
        Ok(group_by_title_prefix(projects))
    }

    pub async fn get_project(&self, id: &ProjectId) -> TrackerResult<Project> {
        self.store
            .get_project(id)
            .await?
            .ok_or_else(|| DomainError::ProjectNotFound(id.to_string()).into())
    }

    pub async fn project_progress(&self, id: &ProjectId) -> TrackerResult<ProjectProgress> {
        self.get_project(id).await?;
        let tasks = self.store.tasks_for_project(id).await?;
        let completed = tasks.iter().filter(|t| t.is_completed()).count();
        Ok(ProjectProgress::new(completed, tasks.len()))
    }

    #[instrument(skip(self, session), fields(by = %session.user_id))]
    pub async fn request_review(&self, session: &Session, id: &ProjectId) -> TrackerResult<Project> {
        let project = self.get_project(id).await?;
        self.seed_tasks_if_empty(id, project.stage).await?;
        let tasks = self.store.tasks_for_stage(id, project.stage).await?;
        progression::check_review_request(&project, &session.user_id, &tasks)?;

        self.set_status(project, ProjectStatus::PendingReview).await
    }

    /// Advisor decision on a project awaiting review
    #[instrument(skip(self, session), fields(by = %session.user_id))]
    pub async fn review_project(
        &self,
        session: &Session,
        id: &ProjectId,
        approve: bool,
    ) -> TrackerResult<Project> {
        let project = self.get_project(id).await?;
        let role = self.resolve_role(&session.user_id).await;
        let decision = if approve {
            ProjectStatus::Approved
        } else {
            ProjectStatus::ChangesRequested
        };
        progression::check_review_decision(&project, role, decision)?;

        self.set_status(project, decision).await
    }

    async fn set_status(&self, mut project: Project, status: ProjectStatus) -> TrackerResult<Project> {
        let now = Utc::now();
        self.store.update_status(&project.id, status, now).await?;

        let from = project.status;
        project.status = status;
        project.updated_at = now;
        self.emit_event(TrackerEvent::StatusChanged {
            project_id: project.id,
            from,
            to: status,
        });
        info!("project {} status {} -> {}", project.id, from, status);
        Ok(project)
    }

    // Stage progression

    /// Seed the catalog checklist of `stage` unless it already has tasks
    ///
    /// Safe to call on every view. Returns the number of tasks inserted.
    #[instrument(skip(self))]
    pub async fn seed_tasks_if_empty(&self, id: &ProjectId, stage: Stage) -> TrackerResult<usize> {
        let project = self.get_project(id).await?;
        project.kind.stage_index(stage)?;

        let plan = progression::seed_plan(&project, stage, Utc::now());
        let count = self.store.seed_tasks_if_empty(id, stage, &plan).await?;
        if count > 0 {
            self.emit_event(TrackerEvent::TasksSeeded {
                project_id: *id,
                stage,
                count,
            });
            info!("seeded {} tasks for {} / {}", count, id, stage);
        }
        Ok(count)
    }

    /// Active-stage checklist for the viewer, seeding it on first view
    pub async fn stage_checklist(
        &self,
        session: &Session,
        id: &ProjectId,
    ) -> TrackerResult<StageChecklist> {
        let project = self.get_project(id).await?;
        self.seed_tasks_if_empty(id, project.stage).await?;

        let tasks = self.store.tasks_for_stage(id, project.stage).await?;
        let role = self.resolve_role(&session.user_id).await;
        Ok(StageChecklist::build(project, tasks, role))
    }

    pub async fn get_task(&self, id: &TaskId) -> TrackerResult<Task> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()).into())
    }

    /// Mark a checklist item completed or pending
    ///
    /// Only items of the project's active stage can change, and only by a
    /// caller holding the item's required role.
    #[instrument(skip(self, session), fields(by = %session.user_id))]
    pub async fn toggle_task(
        &self,
        session: &Session,
        task_id: &TaskId,
        completed: bool,
    ) -> TrackerResult<Task> {
        let mut task = self.get_task(task_id).await?;
        let project = self.get_project(&task.project_id).await?;
        let role = self.resolve_role(&session.user_id).await;
        progression::check_toggle(&project, &task, role)?;

        let now = Utc::now();
        let status = TaskStatus::from_completed(completed);
        self.store.set_task_status(task_id, status, now).await?;
        task.status = status;
        task.updated_at = now;

        self.emit_event(TrackerEvent::TaskToggled {
            task_id: *task_id,
            completed,
            by: session.user_id.clone(),
        });
        debug!("task {} -> {}", task_id, status);
        Ok(task)
    }

    /// Move the project to the next stage of its kind
    ///
    /// Requires the advisor role and a fully completed current stage.
    #[instrument(skip(self, session), fields(by = %session.user_id))]
    pub async fn advance_stage(&self, session: &Session, id: &ProjectId) -> TrackerResult<Project> {
        let mut project = self.get_project(id).await?;
        let role = self.resolve_role(&session.user_id).await;
        // An unseeded stage still has its checklist to finish
        self.seed_tasks_if_empty(id, project.stage).await?;
        let tasks = self.store.tasks_for_stage(id, project.stage).await?;
        let next = progression::check_advance(&project, role, &tasks)?;

        let now = Utc::now();
        self.store.update_stage(id, next, now).await?;

        let from = project.stage;
        project.stage = next;
        project.updated_at = now;
        self.emit_event(TrackerEvent::StageAdvanced {
            project_id: *id,
            from,
            to: next,
        });
        info!("project {} advanced {} -> {}", id, from, next);
        Ok(project)
    }

    // Weekly updates

    /// Post a progress update; blank content is a no-op returning `None`
    #[instrument(skip(self, session, content), fields(author = %session.user_id))]
    pub async fn post_update(
        &self,
        session: &Session,
        content: &str,
    ) -> TrackerResult<Option<WeeklyUpdate>> {
        let Some(update) = WeeklyUpdate::compose(&session.user_id, content, Utc::now()) else {
            debug!("ignoring blank update");
            return Ok(None);
        };

        self.store.insert_update(&update).await?;
        self.emit_event(TrackerEvent::UpdatePosted {
            update_id: update.id,
            author_id: update.author_id.clone(),
        });
        info!("posted update {}", update.id);
        Ok(Some(update))
    }

    /// Rate an update 1 to 5; rating again replaces the caller's value
    #[instrument(skip(self, session), fields(rater = %session.user_id))]
    pub async fn rate_update(
        &self,
        session: &Session,
        update_id: &UpdateId,
        value: i64,
    ) -> TrackerResult<Vec<Rating>> {
        let value = RatingValue::new(value)?;
        if self.store.get_update(update_id).await?.is_none() {
            return Err(DomainError::UpdateNotFound(update_id.to_string()).into());
        }

        self.store
            .upsert_rating(update_id, &session.user_id, value, Utc::now())
            .await?;
        self.emit_event(TrackerEvent::UpdateRated {
            update_id: *update_id,
            rater_id: session.user_id.clone(),
            value: value.value(),
        });

        Ok(self.store.ratings_for(update_id).await?)
    }

    /// Feed, most recent first
    pub async fn list_updates(&self, limit: usize) -> TrackerResult<Vec<WeeklyUpdate>> {
        Ok(self.store.list_updates(limit).await?)
    }

    // Achievements

    /// The whole catalog with the user's unlocked entries marked
    pub async fn list_achievements(&self, user_id: &str) -> TrackerResult<Vec<AchievementView>> {
        let earned = self.store.earned_achievements(user_id).await?;
        Ok(merge_achievements(&earned))
    }

    /// Advisor-only; returns `false` if the user already had it
    #[instrument(skip(self, session), fields(by = %session.user_id))]
    pub async fn award_achievement(
        &self,
        session: &Session,
        user_id: &str,
        kind: AchievementKind,
    ) -> TrackerResult<bool> {
        self.require_advisor(session, "award_achievement").await?;
        let inserted = self.store.record_earned(user_id, kind, Utc::now()).await?;
        if inserted {
            self.emit_event(TrackerEvent::AchievementAwarded {
                user_id: user_id.to_string(),
                kind,
            });
            info!("{} unlocked {}", user_id, kind);
        }
        Ok(inserted)
    }

    async fn require_advisor(&self, session: &Session, operation: &'static str) -> TrackerResult<()> {
        let role = self.resolve_role(&session.user_id).await;
        if !role.is_advisor() {
            return Err(TrackerError::Domain(DomainError::NotAuthorized {
                operation,
                required: Role::Advisor,
            }));
        }
        Ok(())
    }

    // Events

    /// Stream of events emitted from now on
    pub fn subscribe(&self) -> TrackerEventStream {
        TrackerEventStream {
            rx: self.events_tx.subscribe(),
        }
    }

    fn emit_event(&self, event: TrackerEvent) {
        // Without a subscriber the event is dropped
        let _ = self.events_tx.send(event);
    }
}

/// Event stream for subscribers
pub struct TrackerEventStream {
    rx: broadcast::Receiver<TrackerEvent>,
}

impl TrackerEventStream {
    /// Waits for the next event; `None` once the service is gone
    pub async fn next(&mut self) -> Option<TrackerEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("event subscriber lagged, {} events dropped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_next(&mut self) -> Option<TrackerEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("event subscriber lagged, {} events dropped", skipped);
                }
                Err(_) => return None,
            }
        }
    }
}
