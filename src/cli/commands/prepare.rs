//! Prepare command implementation.

use super::print_summary;
use crate::core::prepare;
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Validate show folders and move loose episodes into season folders.
pub fn prepare(root: &Path, dry_run: bool, config: &Config) -> Result<()> {
    println!("{}", "[PREPARE] Normalizing loose episode files...".bold().cyan());
    println!("  {} {}", "Root:".bold(), root.display());
    println!();

    let summary = prepare::prepare_library(root, config, dry_run)?;

    print_summary(&summary, "MOVED", dry_run);
    Ok(())
}
