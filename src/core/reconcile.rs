//! Library reconciliation.
//!
//! Compares a source library against a reference library by TVDB id and
//! routes every duplicate source copy into one of three category folders
//! under a target library:
//! - `better-resolution`: more pixels than the reference copy
//! - `greater-filesize`: not better resolution, but more bytes
//! - `to-delete`: nothing to recommend keeping it
//!
//! Movies (files) are compared as a whole. Shows (directories) are compared
//! episode by episode and keep their relative season/file layout.
//!
//! The run is split into a pure planning pass, an optional probe pre-warm,
//! a decision pass and a strictly sequential relocation pass.

use super::indexer::{build_episode_index, index_tree, iter_nonhidden_files, LibraryIndex};
use super::parser::parse_season_episode;
use super::relocate::{MoveOutcome, Relocator};
use crate::models::decision::{Category, ReconcileCandidate, ReconciliationDecision};
use crate::models::media::TvdbId;
use crate::models::report::RunSummary;
use crate::services::{ResolutionCache, ResolutionProbe};
use crate::utils::fs::{ensure_directory, file_name_string, file_size};
use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for a migrate run.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Replace existing destination entries.
    pub overwrite: bool,
    /// Report decisions without touching the filesystem.
    pub dry_run: bool,
    /// Compare resolutions before sizes.
    pub prefer_resolution: bool,
    /// Probe pre-warm workers; 1 disables the pool.
    pub threads: usize,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            dry_run: false,
            prefer_resolution: true,
            threads: 1,
        }
    }
}

/// Why a source item was not reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// File without an identifier.
    Unidentified,
    /// The reference library has no entry with the identifier.
    NoReference,
    /// Episode file without a season/episode tag.
    UnparseableEpisode,
}

/// A source item left out of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Title key used for statistics.
    pub title: String,
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Output of the planning pass.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    pub candidates: Vec<ReconcileCandidate>,
    pub skipped: Vec<SkippedItem>,
}

impl ReconcilePlan {
    /// Paths worth probing: both sides of every candidate that has a reference.
    pub fn probe_paths(&self) -> Vec<PathBuf> {
        self.candidates
            .iter()
            .filter_map(|c| c.reference.as_ref().map(|r| [c.source.clone(), r.clone()]))
            .flatten()
            .collect()
    }
}

/// Run-scoped cache of reference episode indices, one per identifier.
#[derive(Debug, Default)]
pub struct EpisodeIndexCache {
    indices: HashMap<TvdbId, HashMap<(u32, u32), PathBuf>>,
}

impl EpisodeIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Episode index over every reference directory sharing `id`, built once.
    pub fn get_or_build(&mut self, id: &TvdbId, reference: &LibraryIndex) -> &HashMap<(u32, u32), PathBuf> {
        self.indices.entry(id.clone()).or_insert_with(|| {
            tracing::debug!("Building episode index for tvdb-{}", id);
            build_episode_index(reference.directories(id).map(|e| e.path.as_path()))
        })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Pair every source title with its reference counterpart(s).
///
/// A title whose identifier is absent from the reference is skipped. When the
/// reference only holds the identifier as the other kind (a folder for a
/// movie, a file for a show), the candidates carry no reference and compare
/// against a size of zero.
///
/// Pure with respect to the filesystem apart from directory reads.
pub fn plan_reconciliation(
    source: &LibraryIndex,
    reference: &LibraryIndex,
    episodes: &mut EpisodeIndexCache,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    for entry in source.titles() {
        let Some(id) = entry.external_id.as_ref() else {
            continue;
        };

        if !reference.contains(id) {
            plan.skipped.push(SkippedItem {
                title: id.to_string(),
                path: entry.path.clone(),
                reason: SkipReason::NoReference,
            });
            continue;
        }

        if entry.is_file() {
            plan.candidates.push(ReconcileCandidate {
                tvdb_id: id.clone(),
                source: entry.path.clone(),
                reference: reference.first_file(id).map(|r| r.path.clone()),
                relative_destination: PathBuf::from(&entry.display_name),
            });
            continue;
        }

        let episode_index = episodes.get_or_build(id, reference);
        for episode in iter_nonhidden_files(&entry.path) {
            let Some(key) = parse_season_episode(&file_name_string(&episode)) else {
                plan.skipped.push(SkippedItem {
                    title: id.to_string(),
                    path: episode,
                    reason: SkipReason::UnparseableEpisode,
                });
                continue;
            };

            let relative = episode
                .strip_prefix(&entry.path)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(file_name_string(&episode)));

            plan.candidates.push(ReconcileCandidate {
                tvdb_id: id.clone(),
                reference: episode_index.get(&key).cloned(),
                relative_destination: Path::new(&entry.display_name).join(relative),
                source: episode,
            });
        }
    }

    for path in &source.unidentified {
        plan.skipped.push(SkippedItem {
            title: file_name_string(path),
            path: path.clone(),
            reason: SkipReason::Unidentified,
        });
    }

    plan
}

/// Makes and applies reconciliation decisions.
#[derive(Debug)]
pub struct Reconciler {
    cache: Arc<ResolutionCache>,
    options: MigrateOptions,
}

impl Reconciler {
    pub fn new(cache: Arc<ResolutionCache>, options: MigrateOptions) -> Self {
        Self { cache, options }
    }

    /// Compare one candidate and pick its destination under `target`.
    pub fn decide(&self, candidate: &ReconcileCandidate, target: &Path) -> ReconciliationDecision {
        let probe = self.options.prefer_resolution && candidate.reference.is_some();
        let (source_resolution, reference_resolution) = if probe {
            (
                self.cache.get(&candidate.source),
                candidate.reference.as_deref().and_then(|r| self.cache.get(r)),
            )
        } else {
            (None, None)
        };

        let source_size = file_size(&candidate.source);
        let reference_size = candidate.reference.as_deref().map(file_size).unwrap_or(0);

        let category = Category::decide(
            source_resolution,
            reference_resolution,
            source_size,
            reference_size,
        );

        ReconciliationDecision {
            tvdb_id: candidate.tvdb_id.clone(),
            source: candidate.source.clone(),
            reference: candidate.reference.clone(),
            category,
            destination: target
                .join(category.as_str())
                .join(&candidate.relative_destination),
            source_resolution,
            reference_resolution,
            source_size,
            reference_size,
        }
    }

    /// Decide every candidate of a plan, in plan order.
    pub fn decide_all(&self, plan: &ReconcilePlan, target: &Path) -> Vec<ReconciliationDecision> {
        plan.candidates
            .iter()
            .map(|c| self.decide(c, target))
            .collect()
    }

    /// Report and relocate decisions one by one.
    ///
    /// Filesystem errors are logged and counted; the run continues.
    pub fn apply(
        &self,
        decisions: &[ReconciliationDecision],
        relocator: &mut Relocator,
        summary: &mut RunSummary,
    ) {
        for decision in decisions {
            let title = decision.tvdb_id.to_string();
            relocator.report(decision.describe());

            match relocator.move_or_rename(&decision.source, &decision.destination, self.options.overwrite) {
                Ok(MoveOutcome::Moved) => summary.record_done(&title),
                Ok(MoveOutcome::SkippedExists) => summary.record_skipped(&title),
                Err(e) => {
                    tracing::error!(
                        "Failed to move {} -> {}: {}",
                        decision.source.display(),
                        decision.destination.display(),
                        e
                    );
                    summary.record_error(&title);
                }
            }
        }
    }
}

/// Result of a migrate run.
#[derive(Debug, Default)]
pub struct MigrateReport {
    /// Decisions in the order they were applied.
    pub decisions: Vec<ReconciliationDecision>,
    pub summary: RunSummary,
    /// Distinct identifiers found in the reference library.
    pub reference_ids: usize,
}

/// Reconcile `lib_a` against `lib_b`, relocating duplicates into `lib_c`.
pub async fn migrate(
    lib_a: &Path,
    lib_b: &Path,
    lib_c: &Path,
    options: MigrateOptions,
    probe: Arc<dyn ResolutionProbe>,
) -> Result<MigrateReport> {
    ensure_directory(lib_a)?;
    ensure_directory(lib_b)?;

    let source = index_tree(lib_a)?;
    let reference = index_tree(lib_b)?;
    tracing::info!("Found {} tvdb-ids in library-b", reference.len());

    let mut episodes = EpisodeIndexCache::new();
    let plan = plan_reconciliation(&source, &reference, &mut episodes);
    tracing::debug!(
        "Planned {} candidates, {} skipped",
        plan.candidates.len(),
        plan.skipped.len()
    );

    let cache = Arc::new(ResolutionCache::new(probe));
    if options.prefer_resolution && options.threads > 1 {
        cache.prefetch(plan.probe_paths(), options.threads).await;
    }

    let mut relocator = Relocator::for_run(options.dry_run, &[lib_a, lib_c])?;
    let reconciler = Reconciler::new(cache, options);
    let decisions = reconciler.decide_all(&plan, lib_c);

    let mut summary = RunSummary::default();
    for item in &plan.skipped {
        tracing::debug!("Skipped {:?}: {}", item.reason, item.path.display());
        summary.record_skipped(&item.title);
    }
    reconciler.apply(&decisions, &mut relocator, &mut summary);
    summary.output = relocator.into_lines();

    Ok(MigrateReport {
        decisions,
        summary,
        reference_ids: reference.len(),
    })
}
