//! Loose-file normalisation.
//!
//! Finds show folders named `<Title> (<YYYY>)` (optionally followed by an id
//! token), validates each, and moves loose media files into season folders
//! as `Season SS/<Title (Year)> - eEEsSS.<ext>`.
//!
//! The episode-before-season order in the produced names is intentional.

use super::identifier::strip_tvdb_suffix;
use super::parser::parse_season_episode_loose;
use super::relocate::{MoveOutcome, Relocator};
use super::validate::{loose_media_files, validate_show};
use crate::models::config::Config;
use crate::models::report::RunSummary;
use crate::utils::fs::{ensure_directory, file_name_string, get_extension, is_hidden_name};
use crate::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static RE_SHOW_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.+ \(\d{4}\)(?: (?i:\{tvdb-\d+\}))?$").expect("Invalid show dir regex")
});

/// Check whether a directory name looks like a show folder.
pub fn is_show_dir_name(name: &str) -> bool {
    RE_SHOW_DIR.is_match(name)
}

/// Show folders at any depth below `root`, in walk order.
///
/// A show folder is not searched for nested show folders.
pub fn find_show_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    ensure_directory(root)?;

    let mut shows = Vec::new();
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if is_hidden_name(&name) {
            walker.skip_current_dir();
            continue;
        }
        if is_show_dir_name(&name) {
            shows.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }

    Ok(shows)
}

/// Target path for a loose episode file.
pub fn prepared_path(show_dir: &Path, file: &Path, season: u32, episode: u32) -> PathBuf {
    let title = strip_tvdb_suffix(&file_name_string(show_dir));
    let ext = get_extension(file).map(|e| format!(".{}", e)).unwrap_or_default();
    show_dir
        .join(format!("Season {:02}", season))
        .join(format!("{} - e{:02}s{:02}{}", title, episode, season, ext))
}

/// Validate and normalise one show folder, recording into `summary`.
pub fn prepare_show(
    show_dir: &Path,
    config: &Config,
    relocator: &mut Relocator,
    summary: &mut RunSummary,
) -> Result<()> {
    let title = file_name_string(show_dir);

    let report = validate_show(show_dir, config)?;
    for message in &report.messages {
        relocator.report(message.to_string());
    }
    if !report.is_valid() {
        relocator.report(format!("SKIP show due to validation errors: {}", show_dir.display()));
        summary.record_error(&title);
        return Ok(());
    }

    for file in loose_media_files(show_dir, config)? {
        let Some((season, episode)) = parse_season_episode_loose(&file_name_string(&file)) else {
            summary.record_skipped(&title);
            continue;
        };

        let target = prepared_path(show_dir, &file, season, episode);
        if let Some(season_dir) = target.parent() {
            if !relocator.exists(season_dir) {
                relocator.report(format!("MKDIR: {}", season_dir.display()));
                if let Err(e) = relocator.create_dir_all(season_dir) {
                    tracing::error!("Failed to create {}: {}", season_dir.display(), e);
                    summary.record_error(&title);
                    continue;
                }
            }
        }

        match relocator.move_or_rename(&file, &target, false) {
            Ok(MoveOutcome::Moved) => summary.record_done(&title),
            Ok(MoveOutcome::SkippedExists) => summary.record_skipped(&title),
            Err(e) => {
                tracing::error!("Failed to move {}: {}", file.display(), e);
                summary.record_error(&title);
            }
        }
    }

    Ok(())
}

/// Normalise every show folder under `root`.
///
/// A show that fails validation is skipped entirely; its siblings still run.
pub fn prepare_library(root: &Path, config: &Config, dry_run: bool) -> Result<RunSummary> {
    let shows = find_show_dirs(root)?;
    tracing::info!("Found {} show folders", shows.len());

    let mut relocator = Relocator::for_run(dry_run, &[root])?;
    let mut summary = RunSummary::default();
    for show in &shows {
        if let Err(e) = prepare_show(show, config, &mut relocator, &mut summary) {
            tracing::error!("Failed to prepare {}: {}", show.display(), e);
            summary.record_error(&file_name_string(show));
        }
    }

    summary.output = relocator.into_lines();
    Ok(summary)
}
