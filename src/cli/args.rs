//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// plex-leon - Reconcile and normalize TVDB-tagged media libraries
#[derive(Parser, Debug)]
#[command(name = "plex-leon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Route duplicates of library-b found in library-a into library-c
    Migrate {
        /// Source library
        #[arg(long, value_name = "PATH", default_value = "./data/library-a")]
        lib_a: PathBuf,

        /// Reference library
        #[arg(long, value_name = "PATH", default_value = "./data/library-b")]
        lib_b: PathBuf,

        /// Target library (category folders are created here)
        #[arg(long, value_name = "PATH", default_value = "./data/library-c")]
        lib_c: PathBuf,

        /// Replace existing entries in the target library
        #[arg(long)]
        overwrite: bool,

        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,

        /// Compare file sizes only, never probe resolutions
        #[arg(long)]
        no_resolution: bool,

        /// Probe workers used to pre-warm the resolution cache
        #[arg(long, value_name = "N")]
        threads: Option<usize>,
    },

    /// Rename season folders to `Season NN`
    SeasonRenamer {
        /// Library root
        #[arg(value_name = "LIBRARY", default_value = "./data/library-s")]
        library: PathBuf,

        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,
    },

    /// Rename episode files to `<Show (Year)> - sXXeYY.<ext>`
    EpisodeRenamer {
        /// Library root
        #[arg(value_name = "LIBRARY", default_value = "./data/library-e")]
        library: PathBuf,

        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate show folders and move loose episodes into season folders
    Prepare {
        /// Root to search for show folders
        #[arg(value_name = "ROOT", default_value = "./data/library-p")]
        root: PathBuf,

        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_defaults() {
        let cli = Cli::try_parse_from(["plex-leon", "migrate", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Migrate {
                lib_a,
                lib_c,
                dry_run,
                no_resolution,
                threads,
                ..
            } => {
                assert_eq!(lib_a, PathBuf::from("./data/library-a"));
                assert_eq!(lib_c, PathBuf::from("./data/library-c"));
                assert!(dry_run);
                assert!(!no_resolution);
                assert_eq!(threads, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["plex-leon", "prepare", "/tmp/p", "-v", "--skip-preflight"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.skip_preflight);
        match cli.command {
            Commands::Prepare { root, dry_run } => {
                assert_eq!(root, PathBuf::from("/tmp/p"));
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
