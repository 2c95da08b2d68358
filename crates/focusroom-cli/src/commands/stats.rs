//! Tracked time statistics.

use clap::Subcommand;
use focusroom_core::{Database, TrackedTotal};

use super::{format_ms, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Time tracked today
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Time tracked across the whole run log
    All {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;
    let (totals, json) = match action {
        StatsAction::Today { json } => (db.tracked_today()?, json),
        StatsAction::All { json } => (db.tracked_totals(None)?, json),
    };
    if json {
        return print_json(&totals);
    }
    print_table(&totals);
    Ok(())
}

fn print_table(totals: &[TrackedTotal]) {
    if totals.is_empty() {
        println!("Nothing tracked.");
        return;
    }
    let mut sum = 0i64;
    for t in totals {
        sum += t.total_ms;
        println!(
            "{}  {:>4} runs  {}",
            format_ms(t.total_ms),
            t.runs,
            t.title
        );
    }
    println!("{}  total", format_ms(sum));
}
