//! Filesystem access used by relocation.
//!
//! `RealFs` mutates the disk. `SimulatedFs` snapshots the trees a dry run
//! touches and applies every mutation to that snapshot instead, so later
//! existence checks in the same run see earlier (simulated) moves.

use super::fs::{exists_exact, move_path, remove_path};
use crate::models::media::EntryKind;
use crate::Result;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Operations relocation needs from a filesystem.
pub trait FileSystem: Send {
    /// Existence as the platform reports it.
    fn exists(&self, path: &Path) -> bool;

    /// Existence under exactly this name.
    fn exists_exact(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Children of a directory, sorted.
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn create_dir_all(&mut self, path: &Path) -> Result<()>;

    /// Plain rename on the same filesystem.
    fn rename(&mut self, from: &Path, to: &Path) -> Result<()>;

    /// Rename, falling back to copy and delete across filesystems.
    fn move_path(&mut self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a file or a whole directory tree.
    fn remove(&mut self, path: &Path) -> Result<()>;

    /// Remove a directory only if it is empty.
    fn remove_dir_if_empty(&mut self, path: &Path) -> bool;
}

/// The real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn exists_exact(&self, path: &Path) -> bool {
        exists_exact(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut items: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        items.sort();
        Ok(items)
    }

    fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        Ok(std::fs::create_dir_all(path)?)
    }

    fn rename(&mut self, from: &Path, to: &Path) -> Result<()> {
        Ok(std::fs::rename(from, to)?)
    }

    fn move_path(&mut self, from: &Path, to: &Path) -> Result<()> {
        move_path(from, to)
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        remove_path(path)
    }

    fn remove_dir_if_empty(&mut self, path: &Path) -> bool {
        let is_empty = std::fs::read_dir(path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        is_empty && std::fs::remove_dir(path).is_ok()
    }
}

/// In-memory copy of one or more directory trees.
///
/// Paths below the snapshot roots are answered from memory and never touch
/// the disk. Reads outside the roots fall through to the disk; writes outside
/// the roots are refused.
#[derive(Debug, Default, Clone)]
pub struct SimulatedFs {
    roots: Vec<PathBuf>,
    entries: BTreeMap<PathBuf, EntryKind>,
}

impl SimulatedFs {
    /// Snapshot every entry (hidden ones included) below the given roots.
    ///
    /// A root that does not exist yet is tracked as empty.
    pub fn snapshot(roots: &[&Path]) -> Result<Self> {
        let mut fs = Self::default();

        for root in roots {
            fs.roots.push(root.to_path_buf());
            if !root.exists() {
                continue;
            }
            for entry in WalkDir::new(root).follow_links(false) {
                let entry = entry.map_err(io::Error::from)?;
                let kind = if entry.file_type().is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                fs.entries.insert(entry.into_path(), kind);
            }
        }

        Ok(fs)
    }

    fn covers(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }

    fn ensure_covered(&self, path: &Path) -> Result<()> {
        if self.covers(path) {
            Ok(())
        } else {
            Err(crate::Error::Other(format!(
                "dry run cannot change {} outside the scanned libraries",
                path.display()
            )))
        }
    }

    /// The entry and everything below it.
    fn subtree(&self, path: &Path) -> Vec<PathBuf> {
        self.entries
            .range(path.to_path_buf()..)
            .take_while(|(p, _)| p.starts_with(path))
            .map(|(p, _)| p.clone())
            .collect()
    }

    fn not_found(path: &Path) -> crate::Error {
        io::Error::new(io::ErrorKind::NotFound, path.display().to_string()).into()
    }
}

impl FileSystem for SimulatedFs {
    fn exists(&self, path: &Path) -> bool {
        if self.covers(path) {
            self.entries.contains_key(path)
        } else {
            path.exists()
        }
    }

    fn exists_exact(&self, path: &Path) -> bool {
        if self.covers(path) {
            self.entries.contains_key(path)
        } else {
            exists_exact(path)
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        if self.covers(path) {
            self.entries.get(path) == Some(&EntryKind::Directory)
        } else {
            path.is_dir()
        }
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !self.covers(dir) {
            return RealFs.list_dir(dir);
        }
        if !self.is_dir(dir) {
            return Err(Self::not_found(dir));
        }
        Ok(self
            .subtree(dir)
            .into_iter()
            .filter(|p| p.parent() == Some(dir))
            .collect())
    }

    fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        self.ensure_covered(path)?;
        for ancestor in path.ancestors() {
            if !self.covers(ancestor) || self.entries.contains_key(ancestor) {
                break;
            }
            self.entries.insert(ancestor.to_path_buf(), EntryKind::Directory);
        }
        Ok(())
    }

    fn rename(&mut self, from: &Path, to: &Path) -> Result<()> {
        self.ensure_covered(from)?;
        self.ensure_covered(to)?;

        if !self.entries.contains_key(from) {
            return Err(Self::not_found(from));
        }
        if let Some(parent) = to.parent() {
            if self.covers(parent) && !self.is_dir(parent) {
                return Err(Self::not_found(parent));
            }
        }
        if from == to {
            return Ok(());
        }
        match self.entries.get(to).copied() {
            Some(EntryKind::Directory) if !self.list_dir(to)?.is_empty() => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} is not empty", to.display()),
                )
                .into());
            }
            Some(_) => self.remove(to)?,
            None => {}
        }

        for old in self.subtree(from) {
            if let Some(kind) = self.entries.remove(&old) {
                let relative = old.strip_prefix(from).unwrap_or(Path::new(""));
                let moved = if relative.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(relative)
                };
                self.entries.insert(moved, kind);
            }
        }
        Ok(())
    }

    fn move_path(&mut self, from: &Path, to: &Path) -> Result<()> {
        self.rename(from, to)
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.ensure_covered(path)?;
        if !self.entries.contains_key(path) {
            return Err(Self::not_found(path));
        }
        for p in self.subtree(path) {
            self.entries.remove(&p);
        }
        Ok(())
    }

    fn remove_dir_if_empty(&mut self, path: &Path) -> bool {
        let is_empty = self.is_dir(path) && self.subtree(path).len() == 1;
        is_empty && self.entries.remove(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulated(paths: &[(&str, EntryKind)]) -> SimulatedFs {
        let mut fs = SimulatedFs {
            roots: vec![PathBuf::from("/lib")],
            entries: BTreeMap::new(),
        };
        fs.entries.insert(PathBuf::from("/lib"), EntryKind::Directory);
        for (p, kind) in paths {
            fs.entries.insert(PathBuf::from(p), *kind);
        }
        fs
    }

    #[test]
    fn test_rename_moves_subtree() {
        let mut fs = simulated(&[
            ("/lib/season 1", EntryKind::Directory),
            ("/lib/season 1/a.mkv", EntryKind::File),
            ("/lib/season 10", EntryKind::Directory),
        ]);

        fs.rename(Path::new("/lib/season 1"), Path::new("/lib/Season 01")).unwrap();

        assert!(fs.exists(Path::new("/lib/Season 01/a.mkv")));
        assert!(!fs.exists(Path::new("/lib/season 1")));
        // Sibling sharing a name prefix is untouched
        assert!(fs.exists(Path::new("/lib/season 10")));
        assert_eq!(
            fs.list_dir(Path::new("/lib")).unwrap(),
            vec![PathBuf::from("/lib/Season 01"), PathBuf::from("/lib/season 10")]
        );
    }

    #[test]
    fn test_rename_onto_non_empty_dir_fails() {
        let mut fs = simulated(&[
            ("/lib/a", EntryKind::Directory),
            ("/lib/b", EntryKind::Directory),
            ("/lib/b/x.mkv", EntryKind::File),
        ]);

        assert!(fs.rename(Path::new("/lib/a"), Path::new("/lib/b")).is_err());
        assert!(fs.rename(Path::new("/lib/missing"), Path::new("/lib/c")).is_err());
    }

    #[test]
    fn test_create_and_remove_if_empty() {
        let mut fs = simulated(&[]);

        fs.create_dir_all(Path::new("/lib/x/Season 01")).unwrap();
        assert!(fs.is_dir(Path::new("/lib/x")));
        assert!(fs.remove_dir_if_empty(Path::new("/lib/x/Season 01")));
        assert!(!fs.remove_dir_if_empty(Path::new("/lib/x/Season 01")));
    }

    #[test]
    fn test_writes_outside_roots_are_refused() {
        let mut fs = simulated(&[]);
        assert!(fs.create_dir_all(Path::new("/elsewhere/dir")).is_err());
    }
}
