//! Safe relocation of files and directories.
//!
//! - Plain moves with optional overwrite
//! - Two-step renames for case-only changes (`A` -> `.<prefix>swap_a` -> `a`)
//! - Directory merges that quarantine colliding items under `.<prefix>conflicts`
//!
//! A dry run goes through exactly the same steps against a [`SimulatedFs`]
//! snapshot, so it prints the same lines a real run would, including the
//! effects of earlier operations in the same run.

use crate::utils::fs::file_name_string;
use crate::utils::vfs::{FileSystem, RealFs, SimulatedFs};
use crate::Result;
use std::path::{Path, PathBuf};

/// Result of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Moved (or would be, in dry-run).
    Moved,
    /// Destination exists and overwrite is off.
    SkippedExists,
}

/// Result of a rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Renamed (or would be, in dry-run).
    Renamed,
    /// Directory renamed by merging into an existing canonical directory.
    Merged,
    /// Already carries the requested name.
    Unchanged,
    /// A different entry already holds the target name.
    SkippedExists,
}

/// Items moved by a directory merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Items moved straight into the destination.
    pub moved: Vec<PathBuf>,
    /// Items quarantined: (original path, quarantine path).
    pub conflicts: Vec<(PathBuf, PathBuf)>,
}

/// Names differ, but only by letter case.
pub fn is_case_only_change(old: &Path, new: &Path) -> bool {
    let old_name = file_name_string(old);
    let new_name = file_name_string(new);
    old.parent() == new.parent()
        && old_name != new_name
        && old_name.to_lowercase() == new_name.to_lowercase()
}

/// Path of the quarantine directory inside `dir`.
pub fn conflicts_dir(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!(".{}conflicts", prefix))
}

fn rename_failed(from: &Path, to: &Path, e: impl std::fmt::Display) -> crate::Error {
    crate::Error::RenameFailed(format!("{} -> {}: {}", from.display(), to.display(), e))
}

/// Performs relocations and records every output line it prints.
pub struct Relocator {
    fs: Box<dyn FileSystem>,
    lines: Vec<String>,
}

impl std::fmt::Debug for Relocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relocator")
            .field("lines", &self.lines.len())
            .finish()
    }
}

impl Relocator {
    fn with_fs(fs: Box<dyn FileSystem>) -> Self {
        Self {
            fs,
            lines: Vec::new(),
        }
    }

    /// Relocator that changes the disk.
    pub fn real() -> Self {
        Self::with_fs(Box::new(RealFs))
    }

    /// Relocator working on a snapshot of `roots`; the disk is never changed.
    pub fn simulated(roots: &[&Path]) -> Result<Self> {
        Ok(Self::with_fs(Box::new(SimulatedFs::snapshot(roots)?)))
    }

    /// Simulated for a dry run, real otherwise.
    pub fn for_run(dry_run: bool, roots: &[&Path]) -> Result<Self> {
        if dry_run {
            Self::simulated(roots)
        } else {
            Ok(Self::real())
        }
    }

    /// Print one output line and keep it.
    pub fn report(&mut self, line: impl Into<String>) {
        let line = line.into();
        println!("{}", line);
        self.lines.push(line);
    }

    /// Lines printed so far, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }

    pub fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        self.fs.create_dir_all(path)
    }

    /// Move `src` to `dst`, creating parent directories.
    ///
    /// An existing destination is a reported skip unless `overwrite` is set, in
    /// which case it is removed first.
    pub fn move_or_rename(&mut self, src: &Path, dst: &Path, overwrite: bool) -> Result<MoveOutcome> {
        if self.fs.exists(dst) && (!overwrite || src == dst) {
            self.report(format!("SKIP exists: {}", dst.display()));
            return Ok(MoveOutcome::SkippedExists);
        }

        self.report(format!("MOVE: {} -> {}", src.display(), dst.display()));

        if let Some(parent) = dst.parent() {
            self.fs.create_dir_all(parent)?;
        }
        if self.fs.exists(dst) {
            tracing::debug!("Overwriting {}", dst.display());
            self.fs.remove(dst)?;
        }
        self.fs.move_path(src, dst)?;

        Ok(MoveOutcome::Moved)
    }

    /// First free `.<prefix>swap_<name>[.<n>]` path in `parent`.
    pub fn unique_swap_path(&self, parent: &Path, new_name: &str, prefix: &str) -> PathBuf {
        let swap_name = format!(".{}swap_{}", prefix, new_name);
        let mut swap_path = parent.join(&swap_name);
        let mut i = 1;
        while self.fs.exists(&swap_path) {
            swap_path = parent.join(format!("{}.{}", swap_name, i));
            i += 1;
        }
        swap_path
    }

    /// First free `<stem> (conflict)<ext>` / `<stem> (conflict N)<ext>` path in `dir`.
    pub fn conflict_path(&self, dir: &Path, name: &str) -> PathBuf {
        let as_path = Path::new(name);
        let stem = as_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.to_string());
        let ext = as_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut candidate = dir.join(format!("{} (conflict){}", stem, ext));
        let mut n = 2;
        while self.fs.exists(&candidate) {
            candidate = dir.join(format!("{} (conflict {}){}", stem, n, ext));
            n += 1;
        }
        candidate
    }

    /// Idempotency check shared by the two-step renames.
    fn already_renamed(&self, old: &Path, new: &Path) -> bool {
        old == new || (!self.fs.exists_exact(old) && self.fs.exists_exact(new))
    }

    /// Put a swap entry back under its original name, logging on failure.
    fn restore_from_swap(&mut self, swap: &Path, old: &Path) {
        if self.fs.exists(swap) {
            if let Err(e) = self.fs.rename(swap, old) {
                tracing::error!(
                    "Could not restore {} to {}: {}",
                    swap.display(),
                    old.display(),
                    e
                );
            }
        }
    }

    /// First hop of a two-step rename: `old` to a fresh swap name.
    fn hop_to_swap(&mut self, old: &Path, new: &Path, prefix: &str) -> Result<PathBuf> {
        let parent = old.parent().unwrap_or_else(|| Path::new("."));
        let swap = self.unique_swap_path(parent, &file_name_string(new), prefix);

        self.report(format!("RENAME: {} -> {}", old.display(), swap.display()));
        self.fs
            .rename(old, &swap)
            .map_err(|e| rename_failed(old, &swap, e))?;
        Ok(swap)
    }

    /// Second hop: swap to `new`, restoring the original name on failure.
    fn hop_to_target(&mut self, swap: &Path, old: &Path, new: &Path) -> Result<()> {
        self.report(format!("RENAME: {} -> {}", swap.display(), new.display()));
        if let Err(e) = self.fs.rename(swap, new) {
            self.restore_from_swap(swap, old);
            return Err(rename_failed(swap, new, e));
        }
        Ok(())
    }

    /// Rename a file or directory whose name changes only by case.
    ///
    /// Goes through a hidden swap name so case-insensitive filesystems see two
    /// real renames. If the target shows up between the hops, the swap is renamed
    /// back to the original name and an error is returned.
    pub fn two_step_case_rename(&mut self, old: &Path, new: &Path, prefix: &str) -> Result<RenameOutcome> {
        if self.already_renamed(old, new) {
            return Ok(RenameOutcome::Unchanged);
        }

        let swap = self.hop_to_swap(old, new, prefix)?;

        if self.fs.exists(new) {
            self.report(format!("SKIP exists: {}", new.display()));
            self.restore_from_swap(&swap, old);
            return Err(crate::Error::RenameFailed(format!(
                "{} already exists, kept {}",
                new.display(),
                old.display()
            )));
        }

        self.hop_to_target(&swap, old, new)?;
        Ok(RenameOutcome::Renamed)
    }

    /// Case-only directory rename that merges into an existing canonical directory.
    ///
    /// When `new` already exists as a separate directory, the contents of the
    /// swap directory are merged into it (colliding items are quarantined) and
    /// the emptied swap directory is removed.
    pub fn two_step_dir_rename(&mut self, old: &Path, new: &Path, prefix: &str) -> Result<RenameOutcome> {
        if self.already_renamed(old, new) {
            return Ok(RenameOutcome::Unchanged);
        }

        let swap = self.hop_to_swap(old, new, prefix)?;

        if self.fs.exists(new) {
            self.report(format!("MERGE: {} -> {}", swap.display(), new.display()));
            if let Err(e) = self.merge_directory_contents(&swap, new, prefix) {
                self.restore_from_swap(&swap, old);
                return Err(e);
            }
            if !self.fs.remove_dir_if_empty(&swap) {
                tracing::warn!("Failed to remove swap dir: {}", swap.display());
            }
            return Ok(RenameOutcome::Merged);
        }

        self.hop_to_target(&swap, old, new)?;
        Ok(RenameOutcome::Renamed)
    }

    /// Move `item` into the quarantine directory of `dst`.
    fn quarantine(&mut self, item: &Path, dst: &Path, prefix: &str) -> Result<PathBuf> {
        let quarantine = conflicts_dir(dst, prefix);
        self.fs.create_dir_all(&quarantine)?;

        let conflict = self.conflict_path(&quarantine, &file_name_string(item));
        self.report(format!("CONFLICT: {} -> {}", item.display(), conflict.display()));
        self.fs.rename(item, &conflict)?;
        Ok(conflict)
    }

    /// Move every item directly inside `src` into `dst`.
    ///
    /// Items whose name is already taken in `dst` go to `dst/.<prefix>conflicts`
    /// under a disambiguated name. Nothing is overwritten. Items that fail to move
    /// stay in `src` and are reported in the returned error.
    pub fn merge_directory_contents(&mut self, src: &Path, dst: &Path, prefix: &str) -> Result<MergeReport> {
        let items = self.fs.list_dir(src)?;

        let mut report = MergeReport::default();
        let mut failures = Vec::new();

        for item in items {
            let name = file_name_string(&item);
            let target = dst.join(&name);

            let result = if !self.fs.exists(&target) {
                self.fs.rename(&item, &target).map(|_| report.moved.push(target))
            } else {
                self.quarantine(&item, dst, prefix)
                    .map(|conflict| report.conflicts.push((item.clone(), conflict)))
            };

            if let Err(e) = result {
                tracing::error!("Failed to merge {}: {}", item.display(), e);
                failures.push(format!("{}: {}", item.display(), e));
            }
        }

        if !failures.is_empty() {
            return Err(crate::Error::MergeFailed(failures.join("; ")));
        }

        Ok(report)
    }

    /// Rename `old` to `new` safely.
    ///
    /// Case-only changes use the two-step rename; an existing target is skipped.
    /// The parent of `new` must already exist.
    pub fn rename_entry(&mut self, old: &Path, new: &Path, prefix: &str) -> Result<RenameOutcome> {
        if old == new {
            return Ok(RenameOutcome::Unchanged);
        }

        if is_case_only_change(old, new) {
            return self.two_step_case_rename(old, new, prefix);
        }

        if self.fs.exists(new) {
            self.report(format!("SKIP exists: {}", new.display()));
            return Ok(RenameOutcome::SkippedExists);
        }

        self.report(format!("RENAME: {} -> {}", old.display(), new.display()));
        self.fs
            .rename(old, new)
            .map_err(|e| rename_failed(old, new, e))?;

        Ok(RenameOutcome::Renamed)
    }
}
