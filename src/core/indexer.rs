//! Library tree indexer.
//!
//! Walks a library root to any depth and groups every entry carrying a
//! `{tvdb-<digits>}` token by identifier. Flat, alphabetically bucketed
//! (`A/<title>`) and grouped (`<group>/<title>`) layouts are all handled the
//! same way. Hidden entries (and everything below them) are skipped.

use super::identifier::extract_tvdb_id;
use super::parser::parse_episode_tag;
use crate::models::media::{EntryKind, LibraryEntry, TvdbId};
use crate::utils::fs::{ensure_directory, file_name_string, is_hidden_name};
use crate::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Identifier index of one library.
#[derive(Debug, Default)]
pub struct LibraryIndex {
    /// Library root.
    pub root: PathBuf,
    /// Identifier to entries, in walk order (sorted by file name per directory).
    pub entries: BTreeMap<TvdbId, Vec<LibraryEntry>>,
    /// Files with no identifier that are not inside an identified title.
    pub unidentified: Vec<PathBuf>,
}

impl LibraryIndex {
    /// All entries sharing an identifier.
    pub fn get(&self, id: &TvdbId) -> &[LibraryEntry] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &TvdbId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First file-kind entry for an identifier.
    pub fn first_file(&self, id: &TvdbId) -> Option<&LibraryEntry> {
        self.get(id).iter().find(|e| e.is_file())
    }

    /// All directory-kind entries for an identifier.
    pub fn directories(&self, id: &TvdbId) -> impl Iterator<Item = &LibraryEntry> {
        self.get(id).iter().filter(|e| e.is_dir())
    }

    /// Titles: identified entries not nested inside another identified entry.
    pub fn titles(&self) -> impl Iterator<Item = &LibraryEntry> {
        self.entries.values().flatten().filter(|e| !e.nested)
    }
}

/// Check if a walk entry is hidden. The walk root itself never counts.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && is_hidden_name(&entry.file_name().to_string_lossy())
}

/// Index a library tree by identifier.
pub fn index_tree(root: &Path) -> Result<LibraryIndex> {
    ensure_directory(root)?;

    let mut index = LibraryIndex {
        root: root.to_path_buf(),
        ..Default::default()
    };

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry under {}: {}", root.display(), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let nested = has_identified_ancestor(root, entry.path());

        match extract_tvdb_id(&name) {
            Some(id) => {
                index.entries.entry(id.clone()).or_default().push(LibraryEntry {
                    path: entry.path().to_path_buf(),
                    kind,
                    display_name: name,
                    external_id: Some(id),
                    nested,
                });
            }
            None if kind == EntryKind::File && !nested => {
                index.unidentified.push(entry.path().to_path_buf());
            }
            None => {}
        }
    }

    tracing::debug!(
        "Indexed {}: {} identifiers, {} unidentified files",
        root.display(),
        index.entries.len(),
        index.unidentified.len()
    );

    Ok(index)
}

/// True when a directory between `root` and `path` carries an identifier.
fn has_identified_ancestor(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .ok()
        .and_then(Path::parent)
        .map(|rel| {
            rel.components()
                .any(|c| extract_tvdb_id(&c.as_os_str().to_string_lossy()).is_some())
        })
        .unwrap_or(false)
}

/// Iterate all non-hidden files below a directory, sorted per directory.
pub fn iter_nonhidden_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
}

/// `(season, episode) -> file` lookup over one or more show directories.
///
/// Double episodes are indexed under both episode numbers. The first file
/// seen for a key wins.
pub fn build_episode_index<'a, I>(show_dirs: I) -> HashMap<(u32, u32), PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut index = HashMap::new();

    for dir in show_dirs {
        if !dir.is_dir() {
            continue;
        }
        for path in iter_nonhidden_files(dir) {
            let Some(tag) = parse_episode_tag(&file_name_string(&path)) else {
                continue;
            };
            index.entry(tag.key()).or_insert_with(|| path.clone());
            if let Some(end) = tag.episode_end {
                index.entry((tag.season, end)).or_insert(path);
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_identified_ancestor() {
        let root = Path::new("/lib");
        assert!(!has_identified_ancestor(
            root,
            Path::new("/lib/A/John Wick (2014) {tvdb-155}.mp4")
        ));
        assert!(has_identified_ancestor(
            root,
            Path::new("/lib/Show {tvdb-1}/Season 01/ep.mkv")
        ));
        assert!(!has_identified_ancestor(root, Path::new("/lib/Show {tvdb-1}")));
    }

    // Filesystem-backed tests live in tests/indexer_tests.rs
}
