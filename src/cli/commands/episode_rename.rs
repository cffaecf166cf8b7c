//! Episode renamer command implementation.

use super::print_summary;
use crate::core::episode_renamer;
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Canonicalise episode file names under a library.
pub fn episode_rename(library: &Path, dry_run: bool, config: &Config) -> Result<()> {
    println!("{}", "[EPISODES] Renaming episode files...".bold().cyan());
    println!("  {} {}", "Library:".bold(), library.display());
    println!();

    let summary = episode_renamer::rename_episodes(library, &config.swap_prefix, dry_run)?;

    print_summary(&summary, "RENAMED", dry_run);
    Ok(())
}
