//! Task timing records exchanged between the engine and the task repository.
//!
//! The engine only sees the subset of a task that matters for timing:
//! identity, the banked duration, the start of the active run, completion,
//! and an optional estimate used for the progress ratio.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Timing view of a task.
///
/// `started_at` is present exactly while a run is active, so
/// `is_in_progress()` can never disagree with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Start of the current run, `None` while stopped.
    pub(crate) started_at: Option<DateTime<Utc>>,
    /// Time banked from previous, finished runs. Never negative.
    #[serde(
        serialize_with = "crate::duration_ms::serialize",
        deserialize_with = "crate::duration_ms::non_negative",
        rename = "accumulated_ms"
    )]
    pub(crate) accumulated: Duration,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(
        default,
        with = "crate::duration_ms::option",
        rename = "estimated_ms"
    )]
    pub estimated: Option<Duration>,
}

impl TaskSnapshot {
    /// A stopped task with nothing banked.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            started_at: None,
            accumulated: Duration::zero(),
            is_completed: false,
            estimated: None,
        }
    }

    /// Rebuild a snapshot from stored fields.
    ///
    /// Negative durations are clamped to zero.
    pub fn from_parts(
        id: impl Into<String>,
        title: impl Into<String>,
        started_at: Option<DateTime<Utc>>,
        accumulated: Duration,
        is_completed: bool,
        estimated: Option<Duration>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            started_at,
            accumulated: accumulated.max(Duration::zero()),
            is_completed,
            estimated: estimated.map(|e| e.max(Duration::zero())),
        }
    }

    pub fn with_estimate(mut self, estimated: Duration) -> Self {
        self.estimated = Some(estimated.max(Duration::zero()));
        self
    }

    pub fn is_in_progress(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}

/// Fields the engine asks the repository to store after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingRecord {
    pub task_id: String,
    pub is_in_progress: bool,
    pub started_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::duration_ms", rename = "accumulated_ms")]
    pub accumulated: Duration,
    pub is_completed: bool,
}

impl From<&TaskSnapshot> for TimingRecord {
    fn from(task: &TaskSnapshot) -> Self {
        Self {
            task_id: task.id.clone(),
            is_in_progress: task.is_in_progress(),
            started_at: task.started_at,
            accumulated: task.accumulated,
            is_completed: task.is_completed,
        }
    }
}

/// One finished timing run, banked by a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRun {
    pub task_id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    #[serde(with = "crate::duration_ms", rename = "duration_ms")]
    pub duration: Duration,
}
