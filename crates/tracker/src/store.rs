use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    AchievementKind, EarnedAchievement, Project, ProjectId, ProjectStatus, Rating, RatingValue,
    Role, RoleGrant, RoleGrantSource, Stage, Task, TaskId, TaskStatus, UpdateId, User, UserId,
    WeeklyUpdate,
};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type DbPool = Pool<SqliteConnectionManager>;

const PROJECT_COLUMNS: &str =
    "id, title, description, owner_id, kind, stage, status, created_at, updated_at";

const TASK_COLUMNS: &str = "id, project_id, stage, title, description, status, required_role, \
                            assignee_id, created_at, updated_at";

/// Ratings of an update as a JSON array, in first-rated order
const UPDATE_SELECT: &str = r#"
    SELECT
        u.id, u.author_id, u.content, u.created_at,
        (
            SELECT json_group_array(json_object('rater_id', r.rater_id, 'value', r.value))
            FROM (
                SELECT rater_id, value FROM ratings
                WHERE update_id = u.id
                ORDER BY rowid
            ) r
        ) AS ratings
    FROM weekly_updates u
"#;

/// SQLite store for every tracker table, behind a connection pool
pub struct SqliteStore {
    pool: Arc<DbPool>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .context("Failed to create connection pool")?;

        {
            let conn = pool.get()?;
            Self::init_schema(&conn)?;
        }

        debug!(path = %path.as_ref().display(), pool_size, "opened tracker store");
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                avatar_url TEXT,
                created_at TEXT NOT NULL
            );

            -- A user holds a set of roles; granting twice is a no-op
            CREATE TABLE IF NOT EXISTS role_grants (
                user_id TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('student', 'researcher', 'advisor')),
                granted_at TEXT NOT NULL,
                PRIMARY KEY (user_id, role)
            );

            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                stage TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                stage TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                required_role TEXT NOT NULL DEFAULT 'student',
                assignee_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            );

            -- seq keeps posting order independent of clock resolution
            CREATE TABLE IF NOT EXISTS weekly_updates (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                author_id TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ratings (
                update_id TEXT NOT NULL,
                rater_id TEXT NOT NULL,
                value INTEGER NOT NULL CHECK (value BETWEEN 1 AND 5),
                rated_at TEXT NOT NULL,
                PRIMARY KEY (update_id, rater_id),
                FOREIGN KEY (update_id) REFERENCES weekly_updates(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS earned_achievements (
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                earned_at TEXT NOT NULL,
                PRIMARY KEY (user_id, kind)
            );

            CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner_id, created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_tasks_project_stage ON tasks(project_id, stage);

            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;

        Ok(())
    }

    // Users and roles

    pub async fn upsert_user(&self, user: &User) -> Result<User> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO users (id, display_name, avatar_url, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                avatar_url = COALESCE(excluded.avatar_url, users.avatar_url)",
            params![user.id, user.display_name, user.avatar_url, user.created_at],
        )
        .context("Failed to upsert user")?;

        drop(conn);
        self.get_user(&user.id)
            .await?
            .context("User vanished after upsert")
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;

        let user = conn
            .query_row(
                "SELECT id, display_name, avatar_url, created_at FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        display_name: row.get(1)?,
                        avatar_url: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }

    /// Returns `false` when the grant already existed
    pub async fn grant_role(&self, user_id: &str, role: Role, now: DateTime<Utc>) -> Result<bool> {
        let conn = self.pool.get()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO role_grants (user_id, role, granted_at) VALUES (?1, ?2, ?3)",
            params![user_id, role.as_str(), now],
        )?;

        Ok(inserted > 0)
    }

    /// Grant `role` only if the user holds no grant at all
    pub async fn grant_default_role_if_none(
        &self,
        user_id: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.pool.get()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO role_grants (user_id, role, granted_at)
             SELECT ?1, ?2, ?3
             WHERE NOT EXISTS (SELECT 1 FROM role_grants WHERE user_id = ?1)",
            params![user_id, role.as_str(), now],
        )?;

        Ok(inserted > 0)
    }

    pub async fn role_grants(&self, user_id: &str) -> Result<Vec<RoleGrant>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT user_id, role, granted_at FROM role_grants
             WHERE user_id = ?1 ORDER BY granted_at ASC, rowid ASC",
        )?;
        let grants = stmt
            .query_map(params![user_id], |row| {
                Ok(RoleGrant {
                    user_id: row.get(0)?,
                    role: parse_column(row, 1)?,
                    granted_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(grants)
    }

    // Projects

    /// Insert a family of sibling projects atomically
    #[instrument(skip(self, projects), fields(count = projects.len()))]
    pub async fn insert_projects(&self, projects: &[Project]) -> Result<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO projects ({PROJECT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ))?;

            for project in projects {
                stmt.execute(params![
                    project.id.to_string(),
                    project.title,
                    project.description,
                    project.owner_id,
                    project.kind.as_str(),
                    project.stage.as_str(),
                    project.status.as_str(),
                    project.created_at,
                    project.updated_at,
                ])?;
            }
        }

        tx.commit().context("Failed to commit project batch")?;
        debug!("inserted {} projects", projects.len());
        Ok(())
    }

    pub async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        let conn = self.pool.get()?;

        let project = conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id.to_string()],
                project_from_row,
            )
            .optional()?;

        Ok(project)
    }

    /// Newest first; siblings created together keep their insertion order
    pub async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid ASC"
        ))?;
        let projects = stmt
            .query_map(params![owner_id], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub async fn update_stage(&self, id: &ProjectId, stage: Stage, now: DateTime<Utc>) -> Result<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "UPDATE projects SET stage = ?1, updated_at = ?2 WHERE id = ?3",
            params![stage.as_str(), now, id.to_string()],
        )?;

        Ok(())
    }

    pub async fn update_status(
        &self,
        id: &ProjectId,
        status: ProjectStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "UPDATE projects SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), now, id.to_string()],
        )?;

        Ok(())
    }

    // Tasks

    /// Insert `tasks` for (project, stage) unless that stage already has any
    ///
    /// The count and the insert share one immediate transaction, so the
    /// write lock is taken before the check. Returns the number inserted.
    #[instrument(skip(self, tasks), fields(planned = tasks.len()))]
    pub async fn seed_tasks_if_empty(
        &self,
        project_id: &ProjectId,
        stage: Stage,
        tasks: &[Task],
    ) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM tasks WHERE project_id = ?1 AND stage = ?2",
            params![project_id.to_string(), stage.as_str()],
            |row| row.get(0),
        )?;

        if existing > 0 {
            debug!(existing, "stage already seeded");
            return Ok(0);
        }

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ))?;

            for task in tasks {
                stmt.execute(params![
                    task.id.to_string(),
                    project_id.to_string(),
                    stage.as_str(),
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.required_role.as_str(),
                    task.assignee_id,
                    task.created_at,
                    task.updated_at,
                ])?;
            }
        }

        tx.commit().context("Failed to commit seeded tasks")?;
        Ok(tasks.len())
    }

    /// Every task of the project, all stages, in seeding order
    pub async fn tasks_for_project(&self, project_id: &ProjectId) -> Result<Vec<Task>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ?1 ORDER BY rowid ASC"
        ))?;
        let tasks = stmt
            .query_map(params![project_id.to_string()], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub async fn tasks_for_stage(&self, project_id: &ProjectId, stage: Stage) -> Result<Vec<Task>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE project_id = ?1 AND stage = ?2
             ORDER BY rowid ASC"
        ))?;
        let tasks = stmt
            .query_map(
                params![project_id.to_string(), stage.as_str()],
                task_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        let conn = self.pool.get()?;

        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id.to_string()],
                task_from_row,
            )
            .optional()?;

        Ok(task)
    }

    pub async fn set_task_status(
        &self,
        id: &TaskId,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.pool.get()?;

        let updated = conn.execute(
            "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), now, id.to_string()],
        )?;

        Ok(updated > 0)
    }

    // Weekly updates and ratings

    pub async fn insert_update(&self, update: &WeeklyUpdate) -> Result<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO weekly_updates (id, author_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                update.id.to_string(),
                update.author_id,
                update.content,
                update.created_at,
            ],
        )
        .context("Failed to insert weekly update")?;

        Ok(())
    }

    pub async fn get_update(&self, id: &UpdateId) -> Result<Option<WeeklyUpdate>> {
        let conn = self.pool.get()?;

        let update = conn
            .query_row(
                &format!("{UPDATE_SELECT} WHERE u.id = ?1"),
                params![id.to_string()],
                update_from_row,
            )
            .optional()?;

        Ok(update)
    }

    /// Most recent first
    pub async fn list_updates(&self, limit: usize) -> Result<Vec<WeeklyUpdate>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!("{UPDATE_SELECT} ORDER BY u.seq DESC LIMIT ?1"))?;
        let updates = stmt
            .query_map(params![limit as i64], update_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(updates)
    }

    /// One rating per rater; a second rating replaces the value in place
    pub async fn upsert_rating(
        &self,
        update_id: &UpdateId,
        rater_id: &str,
        value: RatingValue,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO ratings (update_id, rater_id, value, rated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(update_id, rater_id) DO UPDATE SET
                value = excluded.value,
                rated_at = excluded.rated_at",
            params![update_id.to_string(), rater_id, i64::from(value), now],
        )
        .context("Failed to upsert rating")?;

        Ok(())
    }

    pub async fn ratings_for(&self, update_id: &UpdateId) -> Result<Vec<Rating>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT rater_id, value FROM ratings WHERE update_id = ?1 ORDER BY rowid ASC",
        )?;
        let ratings = stmt
            .query_map(params![update_id.to_string()], |row| {
                let value: i64 = row.get(1)?;
                Ok(Rating {
                    rater_id: row.get(0)?,
                    value: RatingValue::new(value).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(1, Type::Integer, Box::new(e))
                    })?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ratings)
    }

    // Achievements

    pub async fn earned_achievements(&self, user_id: &str) -> Result<Vec<EarnedAchievement>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT user_id, kind, earned_at FROM earned_achievements WHERE user_id = ?1",
        )?;
        let earned = stmt
            .query_map(params![user_id], |row| {
                Ok(EarnedAchievement {
                    user_id: row.get(0)?,
                    kind: parse_column::<AchievementKind>(row, 1)?,
                    earned_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(earned)
    }

    /// Returns `false` if already earned; the first timestamp is kept
    pub async fn record_earned(
        &self,
        user_id: &str,
        kind: AchievementKind,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.pool.get()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO earned_achievements (user_id, kind, earned_at) VALUES (?1, ?2, ?3)",
            params![user_id, kind.as_str(), now],
        )?;

        Ok(inserted > 0)
    }
}

#[async_trait]
impl RoleGrantSource for SqliteStore {
    async fn grants_for(&self, user_id: &UserId) -> Result<Vec<Role>> {
        let grants = self.role_grants(user_id).await?;
        Ok(grants.into_iter().map(|g| g.role).collect())
    }
}

/// Parse a TEXT column through `FromStr`, reporting bad values as conversion errors
fn parse_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: parse_column(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        kind: parse_column(row, 4)?,
        stage: parse_column(row, 5)?,
        status: parse_column(row, 6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_column(row, 0)?,
        project_id: parse_column(row, 1)?,
        stage: parse_column(row, 2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: parse_column(row, 5)?,
        required_role: parse_column(row, 6)?,
        assignee_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn update_from_row(row: &Row) -> rusqlite::Result<WeeklyUpdate> {
    let ratings_json: Option<String> = row.get("ratings")?;
    let ratings = match ratings_json {
        Some(json) => serde_json::from_str::<Vec<Rating>>(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        None => Vec::new(),
    };

    Ok(WeeklyUpdate {
        id: parse_column(row, 0)?,
        author_id: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        ratings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DeliverableKind;
    use tempfile::TempDir;

    async fn open() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = SqliteStore::new(dir.path().join("tracker.db"), 2)
            .await
            .expect("store should open");
        (dir, store)
    }

    #[tokio::test]
    async fn test_project_round_trip() {
        let (_dir, store) = open().await;
        let family = Project::family("Thesis", "desc", "u1", Utc::now()).unwrap();
        store.insert_projects(&family).await.unwrap();

        let loaded = store.get_project(&family[1].id).await.unwrap().unwrap();
        assert_eq!(loaded.kind, DeliverableKind::BlogPost);
        assert_eq!(loaded.title, "Thesis - Blog Post");
        assert_eq!(loaded.created_at, family[1].created_at);

        let listed = store.list_projects("u1").await.unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].kind, DeliverableKind::Paper);
        assert!(store.list_projects("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_project_batch_is_rejected_whole() {
        let (_dir, store) = open().await;
        let family = Project::family("Thesis", "desc", "u1", Utc::now()).unwrap();
        store.insert_projects(&family[..1]).await.unwrap();

        assert!(store.insert_projects(&family).await.is_err());
        assert_eq!(store.list_projects("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_default_role_only_without_grants() {
        let (_dir, store) = open().await;
        let now = Utc::now();

        assert!(store
            .grant_default_role_if_none("u1", Role::Student, now)
            .await
            .unwrap());
        assert!(!store
            .grant_default_role_if_none("u1", Role::Researcher, now)
            .await
            .unwrap());
        assert!(store.grant_role("u1", Role::Advisor, now).await.unwrap());
        assert!(!store.grant_role("u1", Role::Advisor, now).await.unwrap());

        let roles = store.grants_for(&"u1".to_string()).await.unwrap();
        assert_eq!(roles, vec![Role::Student, Role::Advisor]);
    }

    #[tokio::test]
    async fn test_rating_upsert_keeps_position() {
        let (_dir, store) = open().await;
        let update = WeeklyUpdate::compose("u1", "week 1", Utc::now()).unwrap();
        store.insert_update(&update).await.unwrap();

        let four = RatingValue::new(4).unwrap();
        let two = RatingValue::new(2).unwrap();
        store.upsert_rating(&update.id, "u2", four, Utc::now()).await.unwrap();
        store.upsert_rating(&update.id, "u3", four, Utc::now()).await.unwrap();
        store.upsert_rating(&update.id, "u2", two, Utc::now()).await.unwrap();

        let loaded = store.get_update(&update.id).await.unwrap().unwrap();
        let raters: Vec<_> = loaded.ratings.iter().map(|r| r.rater_id.as_str()).collect();
        assert_eq!(raters, ["u2", "u3"]);
        assert_eq!(loaded.rating_by("u2"), Some(two));
        assert_eq!(store.ratings_for(&update.id).await.unwrap(), loaded.ratings);
    }
}
