//! Task management commands for CLI.

use chrono::{Duration, Utc};
use clap::Subcommand;
use focusroom_core::{Database, TaskTimer};

use super::{format_ms, open_focus, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,
    },
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a task with its run log
    Show {
        /// Task ID
        id: String,
    },
    /// Delete a task and its runs
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    match action {
        TaskAction::Add { title, estimate } => {
            let db = Database::open()?;
            let estimated = estimate.map(|m| Duration::minutes(i64::from(m)));
            let task = db.create_task(&title, estimated)?;
            eprintln!("Task created: {}", task.id);
            print_json(&task)?;
        }
        TaskAction::List { json } => {
            let db = Database::open()?;
            let tasks = db.list_tasks()?;
            if json {
                return print_json(&tasks);
            }
            if tasks.is_empty() {
                println!("No tasks.");
                return Ok(());
            }
            let now = Utc::now();
            for stored in &tasks {
                let task = &stored.task;
                let elapsed = TaskTimer::elapsed(task, now);
                let marker = if task.is_completed {
                    "x"
                } else if task.is_in_progress() {
                    ">"
                } else {
                    " "
                };
                println!(
                    "[{marker}] {}  {}  {}",
                    task.id,
                    format_ms(elapsed.num_milliseconds()),
                    task.title
                );
            }
        }
        TaskAction::Show { id } => {
            let db = Database::open()?;
            let stored = db
                .get_task(&id)?
                .ok_or_else(|| format!("task not found: {id}"))?;
            let runs = db.runs_for_task(&id)?;
            print_json(&serde_json::json!({
                "task": stored,
                "runs": runs,
            }))?;
        }
        TaskAction::Delete { id } => {
            let focus = open_focus()?;
            let session = focus.session();
            if session.focused_task_id() == Some(id.as_str())
                || session.dismissed_task_id() == Some(id.as_str())
            {
                return Err(format!(
                    "task {id} is held by the focus session; finish or switch away first"
                )
                .into());
            }
            if focus.repository().delete_task(&id)? {
                eprintln!("Task deleted: {id}");
            } else {
                return Err(format!("task not found: {id}").into());
            }
        }
    }
    Ok(())
}
