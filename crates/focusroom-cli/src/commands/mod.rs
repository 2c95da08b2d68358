pub mod config;
pub mod focus;
pub mod pomodoro;
pub mod stats;
pub mod task;

use focusroom_core::{Config, Database, FocusSession, FocusSessionController};
use serde::Serialize;
use tracing::warn;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// kv key holding the serialized focus session between invocations.
const SESSION_KEY: &str = "focus_session";

/// Open the database and rebuild the focus controller from the saved session.
pub fn open_focus() -> CliResult<FocusSessionController<Database>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let session = match db.kv_get(SESSION_KEY)? {
        Some(json) => serde_json::from_str::<FocusSession>(&json).unwrap_or_else(|e| {
            warn!(error = %e, "saved focus session is unreadable, starting fresh");
            FocusSession::new(config.focus.default_mode)
        }),
        None => FocusSession::new(config.focus.default_mode),
    };
    Ok(FocusSessionController::restore(
        db,
        config.pomodoro_settings(),
        session,
    )?)
}

/// Store the session and surface any persistence failure from the last operation.
pub fn save_focus(focus: &mut FocusSessionController<Database>) -> CliResult {
    if let Some(e) = focus.take_persist_error() {
        eprintln!("warning: {e}");
    }
    let json = serde_json::to_string(focus.session())?;
    focus.repository().kv_set(SESSION_KEY, &json)?;
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `90061000` -> `25:01:01`
pub fn format_ms(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_ms_pads_fields() {
        assert_eq!(format_ms(0), "00:00:00");
        assert_eq!(format_ms(61_500), "00:01:01");
        assert_eq!(format_ms(90_061_000), "25:01:01");
        assert_eq!(format_ms(-5), "00:00:00");
    }
}
