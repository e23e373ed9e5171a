pub mod json;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};

use crate::tasks::model::{Category, Task};

/// A record as handed to the store by the manager — everything except the id
/// and timestamp, which the store assigns.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub description: String,
    pub category: Option<Category>,
    pub deadline: Option<NaiveDate>,
}

/// Persistence abstraction over the two interchangeable backends.
///
/// Contract shared by both implementations:
/// - ids are positive, strictly monotonic, never reused within the store's
///   lifetime
/// - `list` orders undated tasks first, then ascending by deadline
/// - every mutation is durable before the call returns
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    async fn insert(&self, new: NewTask) -> Result<Task>;

    async fn get(&self, id: i64) -> Result<Option<Task>>;

    /// List all tasks, or only those matching the completion filter.
    async fn list(&self, completed: Option<bool>) -> Result<Vec<Task>>;

    /// Overwrite the record with `task.id`. Returns false if no such record.
    async fn update(&self, task: &Task) -> Result<bool>;

    /// Returns whether a record was actually removed.
    async fn delete(&self, id: i64) -> Result<bool>;

    async fn delete_all(&self) -> Result<()>;
}

// ─── SqliteStore ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    description: String,
    category: Option<String>,
    deadline: Option<String>,
    completed: bool,
    created_at: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        let category = match self.category {
            Some(raw) => Some(
                Category::parse(&raw)
                    .ok_or_else(|| anyhow::anyhow!("unknown category in store: {raw}"))?,
            ),
            None => None,
        };
        let deadline = self
            .deadline
            .map(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d"))
            .transpose()
            .context("malformed deadline in store")?;
        Ok(Task {
            id: self.id,
            description: self.description,
            category,
            deadline,
            completed: self.completed,
            created_at: Some(self.created_at),
        })
    }
}

/// Relational backend: one `tasks` table in a WAL-mode SQLite database at
/// `{data_dir}/taskd.db`. Every mutation commits immediately.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(data_dir: &Path) -> Result<Self> {
        Self::open_with_slow_query(data_dir, 0).await
    }

    /// Open the store with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn open_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("taskd.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Idempotent schema creation. AUTOINCREMENT keeps deleted ids retired
    /// for the lifetime of the table.
    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                category    TEXT,
                deadline    TEXT,
                completed   INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .context("Creating tasks table")?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteStore {
    async fn insert(&self, new: NewTask) -> Result<Task> {
        let created_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let result = sqlx::query(
            "INSERT INTO tasks (description, category, deadline, completed, created_at)
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(&new.description)
        .bind(new.category.map(|c| c.as_str()))
        .bind(new.deadline.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after insert"))
    }

    async fn get(&self, id: i64) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TaskRow::into_task).transpose()
    }

    async fn list(&self, completed: Option<bool>) -> Result<Vec<Task>> {
        // Undated tasks sort first, then ascending by date.
        let rows: Vec<TaskRow> = match completed {
            Some(flag) => {
                sqlx::query_as(
                    "SELECT * FROM tasks WHERE completed = ?
                     ORDER BY (deadline IS NULL) DESC, deadline ASC",
                )
                .bind(flag)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT * FROM tasks ORDER BY (deadline IS NULL) DESC, deadline ASC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn update(&self, task: &Task) -> Result<bool> {
        let rows = sqlx::query(
            "UPDATE tasks SET description = ?, category = ?, deadline = ?, completed = ?
             WHERE id = ?",
        )
        .bind(&task.description)
        .bind(task.category.map(|c| c.as_str()))
        .bind(task.deadline.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(task.completed)
        .bind(task.id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM tasks").execute(&self.pool).await?;
        Ok(())
    }
}
