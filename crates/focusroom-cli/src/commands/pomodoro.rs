//! Pomodoro phase commands.

use chrono::Utc;
use clap::Subcommand;

use super::{format_ms, open_focus, print_json, save_focus, CliResult};

#[derive(Subcommand)]
pub enum PomodoroAction {
    /// Start a break, ending the current work interval
    Break,
    /// End the break and start the next work interval
    Work,
    /// Show the current phase and time remaining
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PomodoroAction) -> CliResult {
    let mut focus = open_focus()?;
    let now = Utc::now();

    let event = match action {
        PomodoroAction::Break => focus.start_pomodoro_break(now)?,
        PomodoroAction::Work => focus.end_pomodoro_break(now)?,
        PomodoroAction::Status { json } => {
            let Some(pomodoro) = focus.snapshot(now).pomodoro else {
                return Err("timer mode is not pomodoro (try `focus mode pomodoro`)".into());
            };
            if json {
                return print_json(&pomodoro);
            }
            println!("Phase:     {:?}", pomodoro.phase);
            println!("Completed: {}", pomodoro.completed_intervals);
            println!("Remaining: {}", format_ms(pomodoro.remaining_ms));
            if pomodoro.paused {
                println!("(paused)");
            }
            return Ok(());
        }
    };

    save_focus(&mut focus)?;
    print_json(&event)
}
