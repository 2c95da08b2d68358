use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::focus::TimerMode;

/// Every focus controller operation produces an Event.
/// Durations are reported in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    FocusEntered {
        task_id: String,
        /// False when the task was already running and its run was kept.
        resumed: bool,
        at: DateTime<Utc>,
    },
    FocusPaused {
        task_id: String,
        banked_ms: i64,
        accumulated_ms: i64,
        at: DateTime<Utc>,
    },
    FocusResumed {
        task_id: String,
        at: DateTime<Utc>,
    },
    /// Explicit "stepping away" pause.
    BreakTaken {
        task_id: String,
        banked_ms: i64,
        at: DateTime<Utc>,
    },
    FocusDismissed {
        task_id: String,
        still_running: bool,
        at: DateTime<Utc>,
    },
    FocusReopened {
        task_id: String,
        at: DateTime<Utc>,
    },
    FocusSwitched {
        from_task: String,
        to_task: String,
        banked_ms: i64,
        resumed: bool,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        banked_ms: i64,
        accumulated_ms: i64,
        at: DateTime<Utc>,
    },
    CompletionFinished {
        task_id: String,
        at: DateTime<Utc>,
    },
    TimerModeChanged {
        from: TimerMode,
        to: TimerMode,
        at: DateTime<Utc>,
    },
    PomodoroBreakStarted {
        completed_intervals: u32,
        break_ms: i64,
        /// Break started before the work interval ran out.
        early: bool,
        at: DateTime<Utc>,
    },
    PomodoroBreakEnded {
        completed_intervals: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::FocusEntered { at, .. }
            | Event::FocusPaused { at, .. }
            | Event::FocusResumed { at, .. }
            | Event::BreakTaken { at, .. }
            | Event::FocusDismissed { at, .. }
            | Event::FocusReopened { at, .. }
            | Event::FocusSwitched { at, .. }
            | Event::TaskCompleted { at, .. }
            | Event::CompletionFinished { at, .. }
            | Event::TimerModeChanged { at, .. }
            | Event::PomodoroBreakStarted { at, .. }
            | Event::PomodoroBreakEnded { at, .. } => *at,
        }
    }
}
