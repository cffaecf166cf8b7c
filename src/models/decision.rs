//! Reconciliation decision model.

use super::media::{Resolution, TvdbId};
use crate::utils::fs::{format_bytes, format_resolution};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Destination category for a source copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    BetterResolution,
    GreaterFilesize,
    ToDelete,
}

impl Category {
    /// Directory name under the target library.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BetterResolution => "better-resolution",
            Category::GreaterFilesize => "greater-filesize",
            Category::ToDelete => "to-delete",
        }
    }

    /// Resolution beats size beats nothing.
    pub fn decide(
        source_res: Option<Resolution>,
        reference_res: Option<Resolution>,
        source_size: u64,
        reference_size: u64,
    ) -> Self {
        let better_resolution = match (source_res, reference_res) {
            (Some(a), Some(b)) => a.pixels() > b.pixels(),
            _ => false,
        };

        if better_resolution {
            Category::BetterResolution
        } else if source_size > reference_size {
            Category::GreaterFilesize
        } else {
            Category::ToDelete
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source item paired with its reference counterpart, before any probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileCandidate {
    /// Identifier shared by both sides.
    pub tvdb_id: TvdbId,
    /// Source movie file or episode file.
    pub source: PathBuf,
    /// Matching reference file, if any.
    pub reference: Option<PathBuf>,
    /// Path below the category directory (file name, or show/season/file).
    pub relative_destination: PathBuf,
}

/// Outcome of comparing one source item against the reference library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationDecision {
    pub tvdb_id: TvdbId,
    pub source: PathBuf,
    pub reference: Option<PathBuf>,
    /// Chosen category; doubles as the reason tag.
    pub category: Category,
    /// Full destination path (`<target>/<category>/<relative>`).
    pub destination: PathBuf,
    pub source_resolution: Option<Resolution>,
    pub reference_resolution: Option<Resolution>,
    pub source_size: u64,
    pub reference_size: u64,
}

impl ReconciliationDecision {
    /// Reason tag; always identical to the category.
    pub fn reason(&self) -> Category {
        self.category
    }

    /// The `DECISION:` output line.
    pub fn describe(&self) -> String {
        let reference_name = self
            .reference
            .as_deref()
            .map(file_name_lossy)
            .unwrap_or_else(|| "<missing>".to_string());

        format!(
            "DECISION: {} -> {} reason={} A[res={}, size={}] B(name={})[res={}, size={}]",
            file_name_lossy(&self.source),
            self.category,
            self.reason(),
            format_resolution(self.source_resolution),
            format_bytes(self.source_size),
            reference_name,
            format_resolution(self.reference_resolution),
            format_bytes(self.reference_size),
        )
    }
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
