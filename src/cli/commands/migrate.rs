//! Migrate command implementation.
//!
//! Reconciles the source library against the reference library and moves
//! every duplicate into a category folder of the target library.

use super::print_summary;
use crate::core::reconcile::{self, MigrateOptions};
use crate::models::config::Config;
use crate::services::{MediaProbe, ResolutionProbe};
use crate::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

/// Flags of a migrate run, as given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateFlags {
    pub overwrite: bool,
    pub dry_run: bool,
    pub no_resolution: bool,
    pub threads: Option<usize>,
}

/// Run the migrate command.
pub async fn migrate(lib_a: &Path, lib_b: &Path, lib_c: &Path, flags: MigrateFlags, config: &Config) -> Result<()> {
    println!("{}", "[MIGRATE] Reconciling libraries...".bold().cyan());
    println!();
    println!("  {} {}", "Source:".bold(), lib_a.display());
    println!("  {} {}", "Reference:".bold(), lib_b.display());
    println!("  {} {}", "Target:".bold(), lib_c.display());
    println!();

    if flags.dry_run {
        println!("{}", "[DRY-RUN] Showing what would be done:".bold().yellow());
        println!();
    }

    let options = MigrateOptions {
        overwrite: flags.overwrite,
        dry_run: flags.dry_run,
        prefer_resolution: config.migrate.prefer_resolution && !flags.no_resolution,
        threads: flags.threads.unwrap_or(config.migrate.threads).max(1),
    };
    let probe: Arc<dyn ResolutionProbe> = Arc::new(MediaProbe::new(config.probe.clone()));

    let report = reconcile::migrate(lib_a, lib_b, lib_c, options, probe).await?;

    print_summary(&report.summary, "MOVED", flags.dry_run);
    Ok(())
}
