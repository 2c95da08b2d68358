use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::{FocusPhase, TimerMode};
use crate::task::TaskSnapshot;
use crate::timer::PomodoroPhase;

/// Read-only copy of the session plus values derived at `at`.
///
/// Display ticks read this instead of a live reference to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSnapshot {
    pub phase: FocusPhase,
    pub timer_mode: TimerMode,
    pub task: Option<TaskSnapshot>,
    pub elapsed_ms: i64,
    /// 0.0 .. 1.0 against the task estimate.
    pub progress_ratio: f64,
    /// Only in timer mode with an estimate.
    pub countdown_remaining_ms: Option<i64>,
    /// Only in pomodoro mode.
    pub pomodoro: Option<PomodoroSnapshot>,
    pub dismissed_task_id: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSnapshot {
    pub phase: PomodoroPhase,
    pub completed_intervals: u32,
    pub interval_ms: i64,
    pub remaining_ms: i64,
    pub interval_complete: bool,
    pub paused: bool,
}
