//! Run-scoped memoization of probe results.

use super::ffprobe::ResolutionProbe;
use crate::models::media::Resolution;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Read-through cache of resolutions keyed by absolute path.
///
/// Lives for one run; entries are never evicted. Failed probes are cached as `None`.
pub struct ResolutionCache {
    probe: Arc<dyn ResolutionProbe>,
    memo: Mutex<HashMap<PathBuf, Option<Resolution>>>,
}

impl ResolutionCache {
    pub fn new(probe: Arc<dyn ResolutionProbe>) -> Self {
        Self {
            probe,
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn key(path: &Path) -> PathBuf {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    }

    /// Resolution of a file, probing at most once per path.
    pub fn get(&self, path: &Path) -> Option<Resolution> {
        let key = Self::key(path);

        if let Some(cached) = self.lookup(&key) {
            return cached;
        }

        // Probe without holding the lock; a concurrent duplicate probe is harmless.
        let resolution = self.probe.probe(path);
        if let Ok(mut memo) = self.memo.lock() {
            memo.entry(key).or_insert(resolution);
        }
        resolution
    }

    fn lookup(&self, key: &Path) -> Option<Option<Resolution>> {
        self.memo.lock().ok().and_then(|memo| memo.get(key).copied())
    }

    /// Number of memoized paths.
    pub fn len(&self) -> usize {
        self.memo.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Warm the cache with a bounded pool of blocking probe tasks.
    ///
    /// Purely a throughput optimization: results land in the cache and are
    /// read back later in order, so outcomes match a cold run exactly.
    pub async fn prefetch(self: &Arc<Self>, paths: Vec<PathBuf>, workers: usize) {
        let mut seen = HashSet::new();
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .filter(|p| seen.insert(Self::key(p)))
            .filter(|p| self.lookup(&Self::key(p)).is_none())
            .collect();

        if paths.is_empty() || workers <= 1 {
            return;
        }

        tracing::info!("Probing {} files with {} workers", paths.len(), workers);

        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message("Probing resolutions");

        let results: Vec<_> = stream::iter(paths)
            .map(|path| {
                let cache = Arc::clone(self);
                let pb = pb.clone();
                async move {
                    let result = tokio::task::spawn_blocking(move || {
                        cache.get(&path);
                    })
                    .await;
                    pb.inc(1);
                    result
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        for result in results {
            if let Err(e) = result {
                tracing::warn!("Probe task failed: {}", e);
            }
        }

        pb.finish_and_clear();
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("entries", &self.len())
            .finish()
    }
}
