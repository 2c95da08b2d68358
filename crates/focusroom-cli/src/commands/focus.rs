//! Focus session commands.
//!
//! Each invocation restores the saved session, applies one operation at the
//! current time, prints the resulting event, and saves the session back.

use chrono::Utc;
use clap::Subcommand;
use focusroom_core::TimerMode;

use super::{open_focus, print_json, save_focus, CliResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Focus a task, starting its timer
    Enter {
        /// Task ID
        id: String,
    },
    /// Pause or resume the focused task
    Pause,
    /// Pause the focused task (no-op if already paused)
    Break,
    /// Move focus to another task
    Switch {
        /// Task ID
        id: String,
    },
    /// Mark the focused task complete
    Complete,
    /// Clear a completed focus
    Finish,
    /// Hide the focus view, leaving the timer as it is
    Dismiss,
    /// Bring back the dismissed focus
    Reopen,
    /// Change the timer mode
    Mode {
        /// stopwatch, timer or pomodoro
        mode: TimerMode,
    },
    /// Show the current focus state
    Status,
}

pub fn run(action: FocusAction) -> CliResult {
    let mut focus = open_focus()?;
    let now = Utc::now();

    let event = match action {
        FocusAction::Enter { id } => focus.enter_focus(&id, now)?,
        FocusAction::Pause => focus.toggle_pause(now)?,
        FocusAction::Break => focus.take_break(now)?,
        FocusAction::Switch { id } => focus.switch_to(&id, now)?,
        FocusAction::Complete => focus.mark_complete(now)?,
        FocusAction::Finish => focus.finish_completion(now)?,
        FocusAction::Dismiss => focus.dismiss_focus(now)?,
        FocusAction::Reopen => focus.reopen_focus(now)?,
        FocusAction::Mode { mode } => focus.set_timer_mode(mode, now),
        FocusAction::Status => return print_json(&focus.snapshot(now)),
    };

    save_focus(&mut focus)?;
    print_json(&event)
}
