mod controller;
mod handle;
mod session;
mod snapshot;

pub use controller::FocusSessionController;
pub use handle::FocusHandle;
pub use session::{FocusPhase, FocusSession, TimerMode};
pub use snapshot::{FocusSnapshot, PomodoroSnapshot};
