use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::timer::PomodoroState;

/// How the focused task's time is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Count up from the accumulated time.
    #[default]
    Stopwatch,
    /// Count down against the task's estimate.
    Timer,
    /// Alternate work and break phases.
    Pomodoro,
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Stopwatch => write!(f, "stopwatch"),
            TimerMode::Timer => write!(f, "timer"),
            TimerMode::Pomodoro => write!(f, "pomodoro"),
        }
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stopwatch" => Ok(TimerMode::Stopwatch),
            "timer" => Ok(TimerMode::Timer),
            "pomodoro" => Ok(TimerMode::Pomodoro),
            other => Err(format!("unknown timer mode: {other}")),
        }
    }
}

/// Task-focus axis of the session state machine.
///
/// ```text
/// Idle --enter_focus--> Running <--toggle_pause--> Paused
///   ^                      |                          |
///   +-----dismiss_focus----+--------------------------+
///   |                      |
///   +--finish_completion-- Completing <--mark_complete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusPhase {
    Idle,
    Running,
    Paused,
    Completing,
}

/// Serializable focus session state.
///
/// Only the controller mutates it; hosts can store it between runs and
/// hand it back to `FocusSessionController::restore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    pub(crate) focused_task_id: Option<String>,
    /// Last dismissed task, restored by `reopen_focus`.
    #[serde(default)]
    pub(crate) dismissed_task_id: Option<String>,
    #[serde(default)]
    pub(crate) is_paused: bool,
    #[serde(default)]
    pub(crate) completing: bool,
    #[serde(default)]
    pub(crate) timer_mode: TimerMode,
    #[serde(default)]
    pub(crate) pomodoro: PomodoroState,
}

impl FocusSession {
    pub fn new(timer_mode: TimerMode) -> Self {
        Self {
            timer_mode,
            ..Self::default()
        }
    }

    pub fn focused_task_id(&self) -> Option<&str> {
        self.focused_task_id.as_deref()
    }

    pub fn dismissed_task_id(&self) -> Option<&str> {
        self.dismissed_task_id.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn timer_mode(&self) -> TimerMode {
        self.timer_mode
    }

    pub fn pomodoro(&self) -> &PomodoroState {
        &self.pomodoro
    }

    pub fn phase(&self) -> FocusPhase {
        match (&self.focused_task_id, self.completing, self.is_paused) {
            (None, _, _) => FocusPhase::Idle,
            (Some(_), true, _) => FocusPhase::Completing,
            (Some(_), false, true) => FocusPhase::Paused,
            (Some(_), false, false) => FocusPhase::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_mode_parses_case_insensitively() {
        assert_eq!("Pomodoro".parse::<TimerMode>().unwrap(), TimerMode::Pomodoro);
        assert_eq!("timer".parse::<TimerMode>().unwrap(), TimerMode::Timer);
        assert!("egg".parse::<TimerMode>().is_err());
    }

    #[test]
    fn phase_derives_from_flags() {
        let mut session = FocusSession::default();
        assert_eq!(session.phase(), FocusPhase::Idle);
        session.focused_task_id = Some("t".into());
        assert_eq!(session.phase(), FocusPhase::Running);
        session.is_paused = true;
        assert_eq!(session.phase(), FocusPhase::Paused);
        session.completing = true;
        assert_eq!(session.phase(), FocusPhase::Completing);
    }

    #[test]
    fn session_survives_json_without_optional_fields() {
        let session: FocusSession = serde_json::from_str(r#"{"focused_task_id":"t1"}"#).unwrap();
        assert_eq!(session.focused_task_id(), Some("t1"));
        assert_eq!(session.timer_mode(), TimerMode::Stopwatch);
    }
}
