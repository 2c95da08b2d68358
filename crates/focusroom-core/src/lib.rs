//! # Focusroom Core Library
//!
//! Tracks how much wall-clock time is spent on a task and drives a
//! single-task focus session with pause/resume, breaks, and an optional
//! Pomodoro work/break cycle.
//!
//! ## Architecture
//!
//! - **Task timer**: pure transitions over a task's timing fields. Elapsed
//!   time is always derived from stored timestamps and a caller-supplied `now`
//! - **Focus controller**: owned state machine holding at most one focused
//!   task, layering pause/switch/complete and Pomodoro phases on the timer
//! - **Repository**: trait the controller persists through; a SQLite
//!   implementation lives in [`storage`]
//!
//! ## Key Components
//!
//! - [`TaskTimer`]: start/stop/elapsed arithmetic
//! - [`FocusSessionController`]: focus state machine
//! - [`FocusHandle`]: mutex-guarded controller for multi-threaded hosts
//! - [`Database`]: task storage and work log
//! - [`Config`]: TOML configuration

mod duration_ms;

pub mod error;
pub mod events;
pub mod focus;
pub mod repository;
pub mod storage;
pub mod task;
pub mod timer;

pub use error::{
    ConfigError, DatabaseError, FocusError, RepositoryError, RunState, TimerError,
};
pub use events::Event;
pub use focus::{
    FocusHandle, FocusPhase, FocusSession, FocusSessionController, FocusSnapshot,
    PomodoroSnapshot, TimerMode,
};
pub use repository::{MemoryTaskRepository, TaskRepository};
pub use storage::{Config, Database, StoredTask, TrackedTotal};
pub use task::{TaskRun, TaskSnapshot, TimingRecord};
pub use timer::{PomodoroPhase, PomodoroSettings, PomodoroState, StopOutcome, TaskTimer};
