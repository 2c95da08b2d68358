//! SQLite-based task storage and work log.
//!
//! Provides persistent storage for:
//! - Tasks and their timing fields (the focus controller's repository)
//! - Finished timing runs and per-task totals
//! - Key-value store for application state (the saved focus session)

use std::path::Path;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{data_dir, migrations};
use crate::error::{DatabaseError, RepositoryError};
use crate::repository::TaskRepository;
use crate::task::{TaskRun, TaskSnapshot, TimingRecord};

/// A task row together with its bookkeeping timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTask {
    #[serde(flatten)]
    pub task: TaskSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Time tracked for one task across the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTotal {
    pub task_id: String,
    pub title: String,
    pub runs: u64,
    pub total_ms: i64,
}

/// SQLite database for tasks and timing runs.
pub struct Database {
    conn: Connection,
}

/// Timestamps are stored with a fixed width so text comparison orders them.
fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_opt_ts(idx: usize, raw: Option<String>) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

const TASK_COLUMNS: &str = "id, title, estimated_ms, accumulated_ms, started_at, is_completed, \
                            created_at, updated_at, completed_at";

fn row_to_stored_task(row: &rusqlite::Row) -> Result<StoredTask, rusqlite::Error> {
    let task = TaskSnapshot::from_parts(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        parse_opt_ts(4, row.get(4)?)?,
        Duration::milliseconds(row.get::<_, i64>(3)?),
        row.get::<_, bool>(5)?,
        row.get::<_, Option<i64>>(2)?.map(Duration::milliseconds),
    );
    Ok(StoredTask {
        task,
        created_at: parse_ts(6, &row.get::<_, String>(6)?)?,
        updated_at: parse_ts(7, &row.get::<_, String>(7)?)?,
        completed_at: parse_opt_ts(8, row.get(8)?)?,
    })
}

impl Database {
    /// Open the database at `<data_dir>/focusroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()?.join("focusroom.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests and throwaway sessions).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Create a stopped task with a fresh id.
    pub fn create_task(
        &self,
        title: &str,
        estimated: Option<Duration>,
    ) -> Result<TaskSnapshot, rusqlite::Error> {
        let now = Utc::now();
        let id = format!("task-{}", uuid::Uuid::new_v4());
        let mut task = TaskSnapshot::new(id, title);
        if let Some(est) = estimated {
            task = task.with_estimate(est);
        }
        self.conn.execute(
            "INSERT INTO tasks (id, title, estimated_ms, accumulated_ms, started_at,
                                is_in_progress, is_completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, NULL, 0, 0, ?4, ?4)",
            params![
                task.id,
                task.title,
                task.estimated.map(|d| d.num_milliseconds()),
                fmt_ts(now),
            ],
        )?;
        debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    pub fn get_task(&self, id: &str) -> Result<Option<StoredTask>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_stored_task,
            )
            .optional()
    }

    /// All tasks, oldest first.
    pub fn list_tasks(&self) -> Result<Vec<StoredTask>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map([], row_to_stored_task)?;
        rows.collect()
    }

    /// Delete a task and its run log. Returns whether the task existed.
    pub fn delete_task(&self, id: &str) -> Result<bool, rusqlite::Error> {
        self.conn
            .execute("DELETE FROM task_runs WHERE task_id = ?1", params![id])?;
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    // ── Run log ──────────────────────────────────────────────────────

    pub fn runs_for_task(&self, task_id: &str) -> Result<Vec<TaskRun>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT task_id, started_at, stopped_at, duration_ms
             FROM task_runs WHERE task_id = ?1 ORDER BY started_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![task_id], |row| {
            Ok(TaskRun {
                task_id: row.get(0)?,
                started_at: parse_ts(1, &row.get::<_, String>(1)?)?,
                stopped_at: parse_ts(2, &row.get::<_, String>(2)?)?,
                duration: Duration::milliseconds(row.get(3)?),
            })
        })?;
        rows.collect()
    }

    /// Tracked time per task for runs that stopped at or after `since`
    /// (all runs when `None`), largest total first.
    pub fn tracked_totals(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TrackedTotal>, rusqlite::Error> {
        let lower = since.map(fmt_ts).unwrap_or_default();
        let mut stmt = self.conn.prepare(
            "SELECT r.task_id, COALESCE(t.title, ''), COUNT(*), COALESCE(SUM(r.duration_ms), 0)
             FROM task_runs r
             LEFT JOIN tasks t ON t.id = r.task_id
             WHERE r.stopped_at >= ?1
             GROUP BY r.task_id
             ORDER BY 4 DESC, r.task_id ASC",
        )?;
        let rows = stmt.query_map(params![lower], |row| {
            Ok(TrackedTotal {
                task_id: row.get(0)?,
                title: row.get(1)?,
                runs: row.get(2)?,
                total_ms: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    /// Totals for runs stopped since midnight UTC today.
    pub fn tracked_today(&self) -> Result<Vec<TrackedTotal>, rusqlite::Error> {
        let midnight = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc());
        self.tracked_totals(midnight)
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl TaskRepository for Database {
    fn fetch(&self, task_id: &str) -> Result<Option<TaskSnapshot>, RepositoryError> {
        Ok(self.get_task(task_id)?.map(|stored| stored.task))
    }

    fn persist(&mut self, record: &TimingRecord) -> Result<(), RepositoryError> {
        let now = fmt_ts(Utc::now());
        let updated = self.conn.execute(
            "UPDATE tasks
             SET is_in_progress = ?1,
                 started_at     = ?2,
                 accumulated_ms = ?3,
                 is_completed   = ?4,
                 completed_at   = CASE WHEN ?4 THEN COALESCE(completed_at, ?5) ELSE NULL END,
                 updated_at     = ?5
             WHERE id = ?6",
            params![
                record.is_in_progress,
                record.started_at.map(fmt_ts),
                record.accumulated.num_milliseconds(),
                record.is_completed,
                now,
                record.task_id,
            ],
        )?;
        if updated == 0 {
            return Err(RepositoryError::MissingTask(record.task_id.clone()));
        }
        Ok(())
    }

    fn record_run(&mut self, run: &TaskRun) -> Result<(), RepositoryError> {
        self.conn.execute(
            "INSERT INTO task_runs (task_id, started_at, stopped_at, duration_ms)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                run.task_id,
                fmt_ts(run.started_at),
                fmt_ts(run.stopped_at),
                run.duration.num_milliseconds(),
            ],
        )?;
        Ok(())
    }
}
