//! CLI command implementations.

pub mod episode_rename;
pub mod migrate;
pub mod prepare;
pub mod season_rename;

use crate::models::report::RunSummary;
use colored::Colorize;

/// Print the per-title table and the totals line shared by every command.
pub(crate) fn print_summary(summary: &RunSummary, done_label: &str, dry_run: bool) {
    println!();
    println!("{}", "[Summary]".bold().cyan());
    summary.print_per_title(done_label);
    println!();

    let totals = format!(
        "{}: {}  SKIPPED: {}  ERRORS: {}",
        done_label, summary.done, summary.skipped, summary.errors
    );
    if summary.errors > 0 {
        println!("{} {}", "[ERR]".red(), totals);
    } else {
        println!("{} {}", "[OK]".green(), totals);
    }

    if dry_run {
        println!("{}", "[DRY-RUN] No changes were made".yellow());
    }
}
