//! plex-leon CLI
//!
//! Reconciles TVDB-tagged media libraries and normalizes season and episode names.

use clap::Parser;
use plex_leon::cli::{
    args::{Cli, Commands},
    commands::{episode_rename, migrate, prepare, season_rename},
};
use plex_leon::models::config::{load_config, ProbeConfig};
use plex_leon::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = load_config();

    match cli.command {
        Commands::Migrate {
            lib_a,
            lib_b,
            lib_c,
            overwrite,
            dry_run,
            no_resolution,
            threads,
        } => {
            // The probe tools are only needed when resolutions are compared
            if !cli.skip_preflight && !no_resolution && config.migrate.prefer_resolution {
                run_preflight_checks(&config.probe)?;
            }

            let flags = migrate::MigrateFlags {
                overwrite,
                dry_run,
                no_resolution,
                threads,
            };
            migrate::migrate(&lib_a, &lib_b, &lib_c, flags, &config).await?;
        }

        Commands::SeasonRenamer { library, dry_run } => {
            season_rename::season_rename(&library, dry_run, &config)?;
        }

        Commands::EpisodeRenamer { library, dry_run } => {
            episode_rename::episode_rename(&library, dry_run, &config)?;
        }

        Commands::Prepare { root, dry_run } => {
            prepare::prepare(&root, dry_run, &config)?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("plex_leon=debug")
    } else {
        EnvFilter::new("plex_leon=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
fn run_preflight_checks(probe: &ProbeConfig) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(probe);
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above or pass --no-resolution.");
    }

    Ok(())
}
