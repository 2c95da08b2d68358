//! Core error types for focusroom-core.
//!
//! The hierarchy mirrors the layers of the engine: `TimerError` for the pure
//! timing functions, `FocusError` for the session controller, and
//! `RepositoryError` / `DatabaseError` / `ConfigError` for the adapters.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Whether a task's timer currently has an active run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Running => write!(f, "running"),
            RunState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Errors raised by the pure task timer functions.
///
/// These indicate a caller bug: the controller never triggers them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Invalid timer state for task '{task_id}': expected {expected}, found {found}")]
    InvalidTimerState {
        task_id: String,
        expected: RunState,
        found: RunState,
    },
}

/// Errors raised by the focus session controller.
#[derive(Error, Debug)]
pub enum FocusError {
    /// Operation needs a focused task but the session is idle
    #[error("No task is currently focused")]
    NoFocusedTask,

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task '{0}' is already completed")]
    TaskAlreadyCompleted(String),

    /// Session is waiting for `finish_completion`
    #[error("Task '{task_id}' was completed; finish the completion first")]
    CompletionPending { task_id: String },

    #[error("No completion is pending")]
    NotCompleting,

    #[error("No dismissed task to reopen")]
    NothingToReopen,

    #[error("Task '{task_id}' is already focused")]
    AlreadyFocused { task_id: String },

    #[error("Timer mode is not pomodoro")]
    NotInPomodoroMode,

    #[error("Pomodoro break is already running")]
    AlreadyOnBreak,

    #[error("Pomodoro break is not running")]
    NotOnBreak,

    #[error("Work interval is not complete ({remaining_ms} ms remaining)")]
    IntervalNotComplete { remaining_ms: i64 },

    /// Fetching a task failed; nothing was mutated
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Focus session lock poisoned")]
    LockPoisoned,
}

/// Errors reported by a task repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Task '{0}' does not exist in the repository")]
    MissingTask(String),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::Database(err.into())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_timer_state_message_names_both_states() {
        let err = TimerError::InvalidTimerState {
            task_id: "t1".into(),
            expected: RunState::Stopped,
            found: RunState::Running,
        };
        assert_eq!(
            err.to_string(),
            "Invalid timer state for task 't1': expected stopped, found running"
        );
    }

    #[test]
    fn timer_error_converts_into_focus_error() {
        let err: FocusError = TimerError::InvalidTimerState {
            task_id: "t1".into(),
            expected: RunState::Running,
            found: RunState::Stopped,
        }
        .into();
        assert!(matches!(err, FocusError::Timer(_)));
    }

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }
}
