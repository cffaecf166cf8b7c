//! Episode filename canonicalisation.
//!
//! `<Show Title (Year)> - <tag><ext>`, where the show is the folder holding
//! the file, or the one above it when the file sits in a season folder.

use super::identifier::strip_tvdb_suffix;
use super::indexer::iter_nonhidden_files;
use super::parser::{is_season_like, parse_episode_tag};
use super::relocate::{RenameOutcome, Relocator};
use crate::models::report::RunSummary;
use crate::utils::fs::{ensure_directory, file_name_string};
use crate::Result;
use std::path::{Path, PathBuf};

/// One planned episode rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRename {
    /// Show title, identifier stripped.
    pub show: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Show directory owning an episode file, if it lies strictly below `root`.
fn show_dir_for<'a>(root: &Path, file: &'a Path) -> Option<&'a Path> {
    let parent = file.parent()?;
    let show_dir = if is_season_like(&file_name_string(parent)) {
        parent.parent()?
    } else {
        parent
    };

    (show_dir != root && show_dir.starts_with(root)).then_some(show_dir)
}

/// Canonical file name for a tagged episode, or `None` when it has no tag.
pub fn canonical_episode_name(show_dir_name: &str, file_name: &str) -> Option<String> {
    let tag = parse_episode_tag(file_name)?;
    let ext = Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    Some(format!("{} - {}{}", strip_tvdb_suffix(show_dir_name), tag, ext))
}

/// Collect episode files whose name is not canonical yet.
pub fn plan_episode_renames(root: &Path) -> Result<Vec<EpisodeRename>> {
    ensure_directory(root)?;

    let mut plan = Vec::new();
    for file in iter_nonhidden_files(root) {
        let Some(show_dir) = show_dir_for(root, &file) else {
            tracing::debug!("No show folder for {}", file.display());
            continue;
        };
        let show_name = file_name_string(show_dir);
        let Some(new_name) = canonical_episode_name(&show_name, &file_name_string(&file)) else {
            continue;
        };
        if new_name == file_name_string(&file) {
            continue;
        }

        let to = file.with_file_name(new_name);
        plan.push(EpisodeRename {
            show: strip_tvdb_suffix(&show_name),
            from: file,
            to,
        });
    }

    Ok(plan)
}

/// Canonicalise every tagged episode file under `root`.
pub fn rename_episodes(root: &Path, prefix: &str, dry_run: bool) -> Result<RunSummary> {
    let plan = plan_episode_renames(root)?;
    tracing::info!("Found {} episode files to rename", plan.len());

    let mut relocator = Relocator::for_run(dry_run, &[root])?;
    let mut summary = RunSummary::default();
    for rename in &plan {
        match relocator.rename_entry(&rename.from, &rename.to, prefix) {
            Ok(RenameOutcome::Renamed | RenameOutcome::Merged) => summary.record_done(&rename.show),
            Ok(RenameOutcome::SkippedExists) => summary.record_skipped(&rename.show),
            Ok(RenameOutcome::Unchanged) => {}
            Err(e) => {
                tracing::error!("Failed to rename {}: {}", rename.from.display(), e);
                summary.record_error(&rename.show);
            }
        }
    }

    summary.output = relocator.into_lines();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_episode_name() {
        assert_eq!(
            canonical_episode_name("Code Geass (2006) {tvdb-79525}", "code.geass.S1E2.720p.mkv").as_deref(),
            Some("Code Geass (2006) - s01e02.mkv")
        );
        assert_eq!(
            canonical_episode_name("Show (2020)", "Show S01E03-E04.MP4").as_deref(),
            Some("Show (2020) - s01e03-e04.MP4")
        );
        assert_eq!(canonical_episode_name("Show (2020)", "trailer.mkv"), None);
    }

    #[test]
    fn test_show_dir_for() {
        let root = Path::new("/lib");
        assert_eq!(
            show_dir_for(root, Path::new("/lib/Show (2020)/Season 01/x s01e01.mkv")),
            Some(Path::new("/lib/Show (2020)"))
        );
        assert_eq!(
            show_dir_for(root, Path::new("/lib/Show (2020) {tvdb-1}/x s01e01.mkv")),
            Some(Path::new("/lib/Show (2020) {tvdb-1}"))
        );
        // A single digit run makes the parent look like a season folder
        assert_eq!(show_dir_for(root, Path::new("/lib/Show (2020)/x s01e01.mkv")), None);
        assert_eq!(show_dir_for(root, Path::new("/lib/x s01e01.mkv")), None);
        assert_eq!(show_dir_for(root, Path::new("/lib/Season 01/x s01e01.mkv")), None);
    }
}
