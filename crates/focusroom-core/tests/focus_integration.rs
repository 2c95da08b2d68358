//! Integration tests for the focus controller backed by the SQLite store.
//!
//! Drives full sessions through `FocusSessionController<Database>` and checks
//! what ends up persisted: timing fields, completion, the run log, and the
//! saved session.

use chrono::{DateTime, Duration, TimeZone, Utc};
use focusroom_core::{
    Database, Event, FocusError, FocusPhase, FocusSession, FocusSessionController,
    PomodoroSettings, TaskRepository, TimerMode,
};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn settings() -> PomodoroSettings {
    PomodoroSettings::new(Duration::seconds(1500), Duration::seconds(300))
}

#[test]
fn test_pause_resume_scenario_is_persisted() {
    let db = Database::open_memory().unwrap();
    let task = db.create_task("Report", None).unwrap();
    let mut focus = FocusSessionController::new(db, settings());

    focus.enter_focus(&task.id, at(0)).unwrap();
    focus.toggle_pause(at(90)).unwrap();

    let stored = focus.repository().fetch(&task.id).unwrap().unwrap();
    assert_eq!(stored.accumulated(), Duration::seconds(90));
    assert!(!stored.is_in_progress());

    focus.toggle_pause(at(150)).unwrap();
    let stored = focus.repository().fetch(&task.id).unwrap().unwrap();
    assert_eq!(stored.started_at(), Some(at(150)));

    focus.mark_complete(at(330)).unwrap();
    let stored = focus.repository().get_task(&task.id).unwrap().unwrap();
    assert_eq!(stored.task.accumulated(), Duration::seconds(270));
    assert!(stored.task.is_completed);
    assert!(stored.completed_at.is_some());

    let runs = focus.repository().runs_for_task(&task.id).unwrap();
    let durations: Vec<_> = runs.iter().map(|r| r.duration).collect();
    assert_eq!(durations, vec![Duration::seconds(90), Duration::seconds(180)]);
}

#[test]
fn test_switch_leaves_only_new_task_running() {
    let db = Database::open_memory().unwrap();
    let a = db.create_task("A", None).unwrap();
    let b = db.create_task("B", None).unwrap();
    let mut focus = FocusSessionController::new(db, settings());

    focus.enter_focus(&a.id, at(0)).unwrap();
    let event = focus.switch_to(&b.id, at(45)).unwrap();
    assert!(matches!(event, Event::FocusSwitched { banked_ms: 45_000, .. }));

    let repo = focus.repository();
    let a_now = repo.fetch(&a.id).unwrap().unwrap();
    let b_now = repo.fetch(&b.id).unwrap().unwrap();
    assert!(!a_now.is_in_progress());
    assert_eq!(a_now.accumulated(), Duration::seconds(45));
    assert!(b_now.is_in_progress());

    let totals = repo.tracked_totals(None).unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].title, "A");
    assert_eq!(totals[0].total_ms, 45_000);
}

#[test]
fn test_session_restores_across_controllers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focus.db");

    let task_id = {
        let db = Database::open_at(&path).unwrap();
        let task = db.create_task("Long haul", Some(Duration::minutes(10))).unwrap();
        let mut focus = FocusSessionController::new(db, settings());
        focus.set_timer_mode(TimerMode::Pomodoro, at(0));
        focus.enter_focus(&task.id, at(0)).unwrap();
        focus.start_pomodoro_break(at(1500)).unwrap();
        let saved = serde_json::to_string(focus.session()).unwrap();
        focus.repository().kv_set("focus_session", &saved).unwrap();
        task.id
    };

    let db = Database::open_at(&path).unwrap();
    let saved = db.kv_get("focus_session").unwrap().unwrap();
    let session: FocusSession = serde_json::from_str(&saved).unwrap();
    let focus = FocusSessionController::restore(db, settings(), session).unwrap();

    assert_eq!(focus.phase(), FocusPhase::Running);
    assert_eq!(focus.session().focused_task_id(), Some(task_id.as_str()));
    assert_eq!(focus.session().pomodoro().completed_intervals(), 1);
    assert!(focus.session().pomodoro().is_on_break());
    assert_eq!(focus.pomodoro_remaining(at(1600)), Some(Duration::seconds(200)));

    let snap = focus.snapshot(at(300));
    assert_eq!(snap.elapsed_ms, 300_000);
    assert!((snap.progress_ratio - 0.5).abs() < 1e-9);
}

#[test]
fn test_deleted_task_reports_persist_error_without_losing_state() {
    let db = Database::open_memory().unwrap();
    let task = db.create_task("Vanishing", None).unwrap();
    let mut focus = FocusSessionController::new(db, settings());
    focus.enter_focus(&task.id, at(0)).unwrap();

    focus.repository_mut().delete_task(&task.id).unwrap();
    focus.toggle_pause(at(60)).unwrap();

    assert!(focus.take_persist_error().is_some());
    assert_eq!(focus.phase(), FocusPhase::Paused);
    assert_eq!(
        focus.focused_task().unwrap().accumulated(),
        Duration::seconds(60)
    );
}

#[test]
fn test_completed_task_cannot_be_refocused() {
    let db = Database::open_memory().unwrap();
    let task = db.create_task("Done soon", None).unwrap();
    let mut focus = FocusSessionController::new(db, settings());

    focus.enter_focus(&task.id, at(0)).unwrap();
    focus.mark_complete(at(10)).unwrap();
    focus.finish_completion(at(11)).unwrap();

    let err = focus.enter_focus(&task.id, at(12)).unwrap_err();
    assert!(matches!(err, FocusError::TaskAlreadyCompleted(_)));
    assert_eq!(focus.phase(), FocusPhase::Idle);
}
