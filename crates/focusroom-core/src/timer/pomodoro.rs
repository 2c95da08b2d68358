//! Pomodoro phase sub-machine.
//!
//! Alternates between a work phase and a break phase. Remaining time is
//! computed from `phase_started_at` and the caller's `now`; nothing counts
//! down in the background.
//!
//! ```text
//! Work --start_break (completed_intervals += 1)--> Break --end_break--> Work
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PomodoroPhase {
    Work,
    Break,
}

/// Interval lengths and break policy, supplied from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    #[serde(with = "crate::duration_ms", rename = "work_interval_ms")]
    pub work_interval: Duration,
    #[serde(with = "crate::duration_ms", rename = "break_interval_ms")]
    pub break_interval: Duration,
    /// Longer break used every `intervals_before_long_break` completed intervals.
    #[serde(
        default,
        with = "crate::duration_ms::option",
        rename = "long_break_interval_ms"
    )]
    pub long_break_interval: Option<Duration>,
    #[serde(default)]
    pub intervals_before_long_break: u32,
    /// Allow a break before the work interval has run out.
    #[serde(default = "default_true")]
    pub allow_early_break: bool,
}

fn default_true() -> bool {
    true
}

impl PomodoroSettings {
    pub fn new(work_interval: Duration, break_interval: Duration) -> Self {
        Self {
            work_interval: work_interval.max(Duration::zero()),
            break_interval: break_interval.max(Duration::zero()),
            long_break_interval: None,
            intervals_before_long_break: 0,
            allow_early_break: true,
        }
    }

    pub fn with_long_break(mut self, long_break: Duration, every: u32) -> Self {
        self.long_break_interval = Some(long_break.max(Duration::zero()));
        self.intervals_before_long_break = every;
        self
    }

    /// Break length after `completed_intervals` work intervals.
    pub fn break_length(&self, completed_intervals: u32) -> Duration {
        match self.long_break_interval {
            Some(long)
                if self.intervals_before_long_break > 0
                    && completed_intervals > 0
                    && completed_intervals % self.intervals_before_long_break == 0 =>
            {
                long
            }
            _ => self.break_interval,
        }
    }
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self::new(Duration::minutes(25), Duration::minutes(5))
    }
}

/// Pomodoro sub-state of a focus session.
///
/// The default value is the "not running" state used outside pomodoro mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroState {
    is_on_break: bool,
    completed_intervals: u32,
    phase_started_at: Option<DateTime<Utc>>,
    /// Set while the phase clock is frozen.
    #[serde(default)]
    paused_at: Option<DateTime<Utc>>,
}

impl PomodoroState {
    /// A fresh cycle whose first work phase begins at `now`.
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            is_on_break: false,
            completed_intervals: 0,
            phase_started_at: Some(now),
            paused_at: None,
        }
    }

    pub fn is_on_break(&self) -> bool {
        self.is_on_break
    }

    pub fn completed_intervals(&self) -> u32 {
        self.completed_intervals
    }

    pub fn phase_started_at(&self) -> Option<DateTime<Utc>> {
        self.phase_started_at
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn phase(&self) -> PomodoroPhase {
        if self.is_on_break {
            PomodoroPhase::Break
        } else {
            PomodoroPhase::Work
        }
    }

    /// Length of the current phase.
    pub fn interval(&self, settings: &PomodoroSettings) -> Duration {
        if self.is_on_break {
            settings.break_length(self.completed_intervals)
        } else {
            settings.work_interval
        }
    }

    /// `max(0, interval - (now - phase_started_at))`; the full interval if no
    /// phase has started.
    pub fn remaining(&self, settings: &PomodoroSettings, now: DateTime<Utc>) -> Duration {
        let interval = self.interval(settings);
        let Some(started) = self.phase_started_at else {
            return interval;
        };
        let effective_now = self.paused_at.unwrap_or(now);
        let spent = (effective_now - started).max(Duration::zero());
        (interval - spent).max(Duration::zero())
    }

    pub fn is_interval_complete(&self, settings: &PomodoroSettings, now: DateTime<Utc>) -> bool {
        self.remaining(settings, now) <= Duration::zero()
    }

    /// Enter the break phase. Counts one completed work interval.
    pub(crate) fn start_break(&mut self, now: DateTime<Utc>) {
        self.is_on_break = true;
        self.completed_intervals = self.completed_intervals.saturating_add(1);
        self.restart_phase(now);
    }

    /// Return to the work phase.
    pub(crate) fn end_break(&mut self, now: DateTime<Utc>) {
        self.is_on_break = false;
        self.restart_phase(now);
    }

    /// Freeze the phase clock.
    pub(crate) fn pause(&mut self, now: DateTime<Utc>) {
        if self.phase_started_at.is_some() && self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Unfreeze the phase clock, shifting the phase start by the paused span.
    pub(crate) fn resume(&mut self, now: DateTime<Utc>) {
        if let (Some(paused), Some(started)) = (self.paused_at.take(), self.phase_started_at) {
            let gap = (now - paused).max(Duration::zero());
            self.phase_started_at = Some(started + gap);
        }
    }

    fn restart_phase(&mut self, now: DateTime<Utc>) {
        self.phase_started_at = Some(now);
        // a new phase picks up the frozen state of the old one
        if self.paused_at.is_some() {
            self.paused_at = Some(now);
        }
    }
}
