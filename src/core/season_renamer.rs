//! Season folder canonicalisation.
//!
//! Every season-like directory below the top-level show folders is renamed
//! to `Season NN`. The plan is computed from a full walk first and applied
//! deepest-first, so no rename invalidates a path still waiting in the plan.
//! Folders carrying an id token are titles, never seasons.

use super::identifier::has_tvdb_id;
use super::parser::classify_season_dir;
use super::relocate::{is_case_only_change, RenameOutcome, Relocator};
use crate::models::report::RunSummary;
use crate::utils::fs::{ensure_directory, file_name_string, is_hidden_name};
use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One planned season folder rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRename {
    /// Name of the directory holding the season folder.
    pub show: String,
    pub from: PathBuf,
    pub to: PathBuf,
    depth: usize,
}

/// Collect season folders whose name is not canonical yet.
///
/// Top-level entries are show folders and never renamed, nor is any folder
/// with an id token (bucketed layouts such as `A/Show {tvdb-5}`). Hidden
/// directories are not entered.
pub fn plan_season_renames(root: &Path) -> Result<Vec<SeasonRename>> {
    ensure_directory(root)?;

    let mut plan: Vec<SeasonRename> = WalkDir::new(root)
        .min_depth(2)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_name(&e.file_name().to_string_lossy()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            if has_tvdb_id(&name) {
                return None;
            }
            let canonical = classify_season_dir(&name).canonical_name()?;
            if canonical == name {
                return None;
            }
            let from = e.path().to_path_buf();
            let parent = from.parent()?.to_path_buf();
            Some(SeasonRename {
                show: file_name_string(&parent),
                to: parent.join(canonical),
                from,
                depth: e.depth(),
            })
        })
        .collect();

    // Stable: walk order is kept within one depth.
    plan.sort_by(|a, b| b.depth.cmp(&a.depth));
    Ok(plan)
}

/// Apply one season rename.
///
/// Case-only changes merge into an existing canonical folder; other changes
/// are skipped when the canonical folder exists.
pub fn apply_season_rename(rename: &SeasonRename, relocator: &mut Relocator, prefix: &str) -> Result<RenameOutcome> {
    if is_case_only_change(&rename.from, &rename.to) {
        relocator.two_step_dir_rename(&rename.from, &rename.to, prefix)
    } else {
        relocator.rename_entry(&rename.from, &rename.to, prefix)
    }
}

/// Canonicalise every season folder under `root`.
///
/// A dry run replays the plan against a snapshot of `root`, so its output
/// matches a real run line for line.
pub fn rename_seasons(root: &Path, prefix: &str, dry_run: bool) -> Result<RunSummary> {
    let plan = plan_season_renames(root)?;
    tracing::info!("Found {} season folders to rename", plan.len());

    let mut relocator = Relocator::for_run(dry_run, &[root])?;
    let mut summary = RunSummary::default();
    for rename in &plan {
        match apply_season_rename(rename, &mut relocator, prefix) {
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
