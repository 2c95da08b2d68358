mod pomodoro;
mod task_timer;

pub use pomodoro::{PomodoroPhase, PomodoroSettings, PomodoroState};
pub use task_timer::{StopOutcome, TaskTimer};
