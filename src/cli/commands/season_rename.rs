//! Season renamer command implementation.

use super::print_summary;
use crate::core::season_renamer;
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Canonicalise season folder names under a library.
pub fn season_rename(library: &Path, dry_run: bool, config: &Config) -> Result<()> {
    println!("{}", "[SEASONS] Renaming season folders...".bold().cyan());
    println!("  {} {}", "Library:".bold(), library.display());
    println!();

    let summary = season_renamer::rename_seasons(library, &config.swap_prefix, dry_run)?;

    print_summary(&summary, "RENAMED", dry_run);
    Ok(())
}
