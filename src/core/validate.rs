//! Pre-flight validation of show directories.
//!
//! Runs before any structural change to a show. An ERROR skips the whole
//! show for the run; a WARN is informational.

use super::identifier::has_tvdb_id;
use super::parser::parse_season_episode_loose;
use crate::models::config::Config;
use crate::models::report::ValidationReport;
use crate::utils::fs::{file_name_string, is_hidden_name};
use crate::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Loose (non-directory, non-hidden) media files directly under a show directory, sorted.
pub fn loose_media_files(show_dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(show_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| !is_hidden_name(&file_name_string(p)))
        .filter(|p| config.is_media_file(p))
        .collect();
    files.sort();
    Ok(files)
}

/// Validate a show directory.
///
/// - ERROR when the folder name has no `{tvdb-<digits>}` token
/// - ERROR for every `(season, episode)` claimed by more than one loose file
/// - WARN for loose media files without a recognisable season/episode
pub fn validate_show(show_dir: &Path, config: &Config) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();
    let name = file_name_string(show_dir);

    if !has_tvdb_id(&name) {
        report.error(format!("missing tvdb id in show folder name: '{}'", name));
    }

    let mut claims: BTreeMap<(u32, u32), Vec<String>> = BTreeMap::new();
    for file in loose_media_files(show_dir, config)? {
        let file_name = file_name_string(&file);
        match parse_season_episode_loose(&file_name) {
            Some(key) => claims.entry(key).or_default().push(file_name),
            None => report.warn(format!(
                "could not parse season/episode from filename: {}",
                file_name
            )),
        }
    }

    for ((season, episode), files) in claims {
        if files.len() > 1 {
            report.error(format!(
                "duplicate episode detected S{:02}E{:02}: {}",
                season,
                episode,
                files.join(", ")
            ));
        }
    }

    Ok(report)
}

// Filesystem-backed tests live in tests/prepare_tests.rs
