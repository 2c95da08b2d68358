//! Pure timing transitions over a task snapshot.
//!
//! Every function takes the current snapshot plus a caller-supplied `now` and
//! returns a new snapshot. Nothing here knows about focus, pomodoro phases,
//! or persistence; elapsed time is always derived from the stored timestamps.
//!
//! ```text
//! Stopped --start/resume--> Running --stop--> Stopped (accumulated += ran_for)
//! ```

use chrono::{DateTime, Duration, Utc};

use crate::error::{RunState, TimerError};
use crate::task::{TaskRun, TaskSnapshot};

/// Result of stopping a running task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopOutcome {
    pub task: TaskSnapshot,
    /// Length of the run that was just banked (never negative).
    pub ran_for: Duration,
    /// The banked run, for the work log.
    pub run: TaskRun,
}

/// Stateless namespace for the task timing transitions.
pub struct TaskTimer;

impl TaskTimer {
    /// Begin a run. The task must be stopped.
    pub fn start(task: &TaskSnapshot, now: DateTime<Utc>) -> Result<TaskSnapshot, TimerError> {
        if task.is_in_progress() {
            return Err(TimerError::InvalidTimerState {
                task_id: task.id.clone(),
                expected: RunState::Stopped,
                found: RunState::Running,
            });
        }
        let mut next = task.clone();
        next.started_at = Some(now);
        Ok(next)
    }

    /// Resume a previously stopped task. Same postconditions as [`TaskTimer::start`].
    pub fn resume(task: &TaskSnapshot, now: DateTime<Utc>) -> Result<TaskSnapshot, TimerError> {
        Self::start(task, now)
    }

    /// End the active run and bank its length into `accumulated`.
    ///
    /// A `now` earlier than `started_at` (clock skew) banks zero.
    pub fn stop(task: &TaskSnapshot, now: DateTime<Utc>) -> Result<StopOutcome, TimerError> {
        let started_at = task.started_at.ok_or_else(|| TimerError::InvalidTimerState {
            task_id: task.id.clone(),
            expected: RunState::Running,
            found: RunState::Stopped,
        })?;
        let ran_for = (now - started_at).max(Duration::zero());
        let mut next = task.clone();
        next.accumulated = next.accumulated + ran_for;
        next.started_at = None;
        Ok(StopOutcome {
            run: TaskRun {
                task_id: task.id.clone(),
                started_at,
                stopped_at: now.max(started_at),
                duration: ran_for,
            },
            task: next,
            ran_for,
        })
    }

    /// Total time spent on the task as of `now`, including the active run.
    pub fn elapsed(task: &TaskSnapshot, now: DateTime<Utc>) -> Duration {
        let live = task
            .started_at
            .map(|started| (now - started).max(Duration::zero()))
            .unwrap_or_else(Duration::zero);
        task.accumulated + live
    }

    /// `elapsed / estimated` clamped to `0.0 ..= 1.0`; `0.0` without an estimate.
    pub fn progress_ratio(task: &TaskSnapshot, now: DateTime<Utc>) -> f64 {
        let estimated_ms = match task.estimated {
            Some(est) if est > Duration::zero() => est.num_milliseconds() as f64,
            _ => return 0.0,
        };
        let elapsed_ms = Self::elapsed(task, now).num_milliseconds() as f64;
        (elapsed_ms / estimated_ms).clamp(0.0, 1.0)
    }

    /// Time left against the estimate, clamped at zero. `None` without an estimate.
    pub fn countdown_remaining(task: &TaskSnapshot, now: DateTime<Utc>) -> Option<Duration> {
        task.estimated
            .map(|est| (est - Self::elapsed(task, now)).max(Duration::zero()))
    }
}
