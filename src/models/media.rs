//! Media-related data models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// External TVDB identifier embedded in a file or folder name.
///
/// Kept as the verbatim digit string so leading zeros survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TvdbId(String);

impl TvdbId {
    /// Wrap a digit string.
    pub fn new<S: Into<String>>(digits: S) -> Self {
        Self(digits.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TvdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "directory"),
        }
    }
}

/// A file or directory found while indexing a library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Full path to the entry.
    pub path: PathBuf,
    /// File or directory.
    pub kind: EntryKind,
    /// Basename.
    pub display_name: String,
    /// Identifier parsed from the basename.
    pub external_id: Option<TvdbId>,
    /// True when an ancestor below the library root already carries an identifier
    /// (e.g. an episode file inside a tagged show folder).
    pub nested: bool,
}

impl LibraryEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Pixel dimensions of the primary video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Season/episode information parsed from a filename.
///
/// `episode_end` is only set for double episodes and is never below `episode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpisodeTag {
    pub season: u32,
    pub episode: u32,
    pub episode_end: Option<u32>,
}

impl EpisodeTag {
    pub const fn new(season: u32, episode: u32) -> Self {
        Self {
            season,
            episode,
            episode_end: None,
        }
    }

    /// Key used to match episodes across libraries.
    pub const fn key(&self) -> (u32, u32) {
        (self.season, self.episode)
    }
}

/// Canonical lowercase form: `sSSeEE` or `sSSeEE-eFF`.
impl fmt::Display for EpisodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{:02}e{:02}", self.season, self.episode)?;
        if let Some(end) = self.episode_end {
            write!(f, "-e{:02}", end)?;
        }
        Ok(())
    }
}

/// Classification of a directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonFolder {
    /// Zero or several digit runs.
    NotSeason,
    /// Exactly one digit run, holding the season number.
    Season(u32),
}

impl SeasonFolder {
    pub fn number(self) -> Option<u32> {
        match self {
            SeasonFolder::NotSeason => None,
            SeasonFolder::Season(n) => Some(n),
        }
    }

    /// Canonical folder name, e.g. `Season 01`.
    pub fn canonical_name(self) -> Option<String> {
        self.number().map(|n| format!("Season {:02}", n))
    }
}
