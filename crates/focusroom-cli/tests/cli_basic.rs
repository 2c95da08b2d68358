//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusroom"))
        .args(args)
        .env("FOCUSROOM_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

fn add_task(data_dir: &Path, title: &str) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, &["task", "add", title]);
    assert_eq!(code, 0, "task add failed: {stderr}");
    assert!(stderr.contains("Task created:"));
    json(&stdout)["id"].as_str().unwrap().to_string()
}

#[test]
fn test_task_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), "Write report");

    let (stdout, _, code) = run_cli(dir.path(), &["task", "list", "--json"]);
    assert_eq!(code, 0);
    let tasks = json(&stdout);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], id.as_str());
    assert_eq!(tasks[0]["title"], "Write report");

    let (stdout, _, code) = run_cli(dir.path(), &["task", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Write report"));
}

#[test]
fn test_focus_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), "Deep work");

    let (stdout, stderr, code) = run_cli(dir.path(), &["focus", "enter", &id]);
    assert_eq!(code, 0, "focus enter failed: {stderr}");
    assert_eq!(json(&stdout)["type"], "FocusEntered");

    let (stdout, _, code) = run_cli(dir.path(), &["focus", "status"]);
    assert_eq!(code, 0);
    let snap = json(&stdout);
    assert_eq!(snap["phase"], "running");
    assert_eq!(snap["task"]["id"], id.as_str());

    let (stdout, _, code) = run_cli(dir.path(), &["focus", "pause"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "FocusPaused");

    let (stdout, _, _) = run_cli(dir.path(), &["focus", "status"]);
    assert_eq!(json(&stdout)["phase"], "paused");

    let (stdout, _, code) = run_cli(dir.path(), &["focus", "complete"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "TaskCompleted");

    let (_, stderr, code) = run_cli(dir.path(), &["focus", "pause"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["focus", "finish"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["focus", "status"]);
    assert_eq!(json(&stdout)["phase"], "idle");

    let (stdout, _, code) = run_cli(dir.path(), &["task", "show", &id]);
    assert_eq!(code, 0);
    let shown = json(&stdout);
    assert_eq!(shown["task"]["is_completed"], true);
    assert_eq!(shown["runs"].as_array().unwrap().len(), 1);
}

#[test]
fn test_focus_without_task_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["focus", "pause"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["focus", "enter", "task-missing"]);
    assert_ne!(code, 0);
}

#[test]
fn test_delete_refuses_focused_task() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_task(dir.path(), "Pinned");
    run_cli(dir.path(), &["focus", "enter", &id]);

    let (_, _, code) = run_cli(dir.path(), &["task", "delete", &id]);
    assert_ne!(code, 0);

    let other = add_task(dir.path(), "Loose");
    let (_, _, code) = run_cli(dir.path(), &["task", "delete", &other]);
    assert_eq!(code, 0);
}

#[test]
fn test_pomodoro_requires_mode() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["pomodoro", "status"]);
    assert_ne!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["focus", "mode", "pomodoro"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "TimerModeChanged");

    let (stdout, _, code) = run_cli(dir.path(), &["pomodoro", "status", "--json"]);
    assert_eq!(code, 0);
    let pomo = json(&stdout);
    assert_eq!(pomo["phase"], "work");
    assert_eq!(pomo["completed_intervals"], 0);

    let (stdout, _, code) = run_cli(dir.path(), &["pomodoro", "break"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "PomodoroBreakStarted");
    assert_eq!(json(&stdout)["early"], true);

    let (stdout, _, code) = run_cli(dir.path(), &["pomodoro", "work"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["completed_intervals"], 1);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "pomodoro.work_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "pomodoro.work_minutes", "50"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "pomodoro.work_minutes"]);
    assert_eq!(stdout.trim(), "50");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "pomodoro.bogus", "1"]);
    assert_ne!(code, 0);

    let (stdout, _, _) = run_cli(dir.path(), &["config", "path"]);
    assert!(stdout.trim().ends_with("config.toml"));
}

#[test]
fn test_stats_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["stats", "all", "--json"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout), serde_json::json!([]));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("focusroom"));
}

#[test]
fn test_pomodoro_default_mode_starts_cycle_on_focus() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "focus.default_mode", "pomodoro"]);
    assert_eq!(code, 0);
    let id = add_task(dir.path(), "Cycle");

    let (_, stderr, code) = run_cli(dir.path(), &["focus", "enter", &id]);
    assert_eq!(code, 0, "focus enter failed: {stderr}");
    std::thread::sleep(std::time::Duration::from_millis(50));

    let (stdout, _, code) = run_cli(dir.path(), &["pomodoro", "status", "--json"]);
    assert_eq!(code, 0);
    let pomo = json(&stdout);
    assert_eq!(pomo["phase"], "work");
    let interval = pomo["interval_ms"].as_i64().unwrap();
    let remaining = pomo["remaining_ms"].as_i64().unwrap();
    assert!(remaining < interval, "phase clock is not running: {pomo}");
}

#[test]
fn test_broken_config_warns_and_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[pomodoro\nwork_minutes = ").unwrap();

    let (stdout, stderr, code) = run_cli(dir.path(), &["focus", "status"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("config unreadable"), "no warning in: {stderr}");
    assert_eq!(json(&stdout)["phase"], "idle");
}
