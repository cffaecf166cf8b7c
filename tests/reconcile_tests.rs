//! Integration tests for library reconciliation.
//!
//! Tests cover:
//! - Resolution, size and to-delete routing for movies
//! - Episode-level reconciliation of shows
//! - Skips for missing references and unparseable episodes
//! - Dry-run parity with a real run
//! - Probe pre-warm pool

use plex_leon::core::indexer::index_tree;
use plex_leon::core::reconcile::{
    migrate, plan_reconciliation, EpisodeIndexCache, MigrateOptions, SkipReason,
};
use plex_leon::models::decision::Category;
use plex_leon::models::media::Resolution;
use plex_leon::services::ResolutionProbe;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const MB: u64 = 1024 * 1024;

/// In-memory probe keyed by absolute path.
#[derive(Default)]
struct FakeProbe {
    resolutions: HashMap<PathBuf, Resolution>,
    calls: AtomicUsize,
}

impl FakeProbe {
    fn with(mut self, path: &Path, width: u32, height: u32) -> Self {
        self.resolutions
            .insert(path.to_path_buf(), Resolution::new(width, height));
        self
    }
}

impl ResolutionProbe for FakeProbe {
    fn probe(&self, path: &Path) -> Option<Resolution> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.resolutions.get(path).copied()
    }
}

struct Libraries {
    _temp_dir: TempDir,
    a: PathBuf,
    b: PathBuf,
    c: PathBuf,
}

fn libraries() -> Libraries {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("library-a");
    let b = temp_dir.path().join("library-b");
    let c = temp_dir.path().join("library-c");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::create_dir_all(&c).unwrap();
    Libraries {
        _temp_dir: temp_dir,
        a,
        b,
        c,
    }
}

/// Create a (sparse) file of the given size.
fn sized_file(path: &Path, size: u64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::File::create(path).unwrap().set_len(size).unwrap();
}

fn options(dry_run: bool) -> MigrateOptions {
    MigrateOptions {
        dry_run,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_better_resolution_movie() {
    let libs = libraries();
    let src = libs.a.join("John Wick (2014) {tvdb-155}.mp4");
    let reference = libs.b.join("J/John Wick (2014) {tvdb-155}.mp4");
    sized_file(&src, 10 * MB);
    sized_file(&reference, 5 * MB);

    let probe = FakeProbe::default()
        .with(&src, 1280, 720)
        .with(&reference, 720, 480);

    let report = migrate(&libs.a, &libs.b, &libs.c, options(false), Arc::new(probe))
        .await
        .unwrap();

    assert_eq!(report.decisions.len(), 1);
    let decision = &report.decisions[0];
    assert_eq!(decision.category, Category::BetterResolution);
    assert_eq!(
        decision.describe(),
        "DECISION: John Wick (2014) {tvdb-155}.mp4 -> better-resolution reason=better-resolution \
         A[res=1280x720, size=10.0 MB] B(name=John Wick (2014) {tvdb-155}.mp4)[res=720x480, size=5.0 MB]"
    );
    assert!(libs
        .c
        .join("better-resolution/John Wick (2014) {tvdb-155}.mp4")
        .exists());
    assert!(!src.exists());
    assert!(reference.exists());
    assert_eq!(report.summary.done, 1);
}

#[tokio::test]
async fn test_unknown_resolution_falls_back_to_size() {
    let libs = libraries();
    let src = libs.a.join("Alien (1979) {tvdb-1001}.mkv");
    let reference = libs.b.join("Alien (1979) {tvdb-1001}.mkv");
    sized_file(&src, 2 * MB);
    sized_file(&reference, MB);

    let report = migrate(
        &libs.a,
        &libs.b,
        &libs.c,
        options(false),
        Arc::new(FakeProbe::default()),
    )
    .await
    .unwrap();

    assert_eq!(report.decisions[0].category, Category::GreaterFilesize);
    assert!(libs
        .c
        .join("greater-filesize/Alien (1979) {tvdb-1001}.mkv")
        .exists());
}

#[tokio::test]
async fn test_one_sided_resolution_is_ignored() {
    let libs = libraries();
    let src = libs.a.join("Heat (1995) {tvdb-2}.mkv");
    let reference = libs.b.join("Heat (1995) {tvdb-2}.mkv");
    sized_file(&src, MB);
    sized_file(&reference, 2 * MB);

    let probe = FakeProbe::default().with(&src, 3840, 2160);
    let report = migrate(&libs.a, &libs.b, &libs.c, options(true), Arc::new(probe))
        .await
        .unwrap();

    assert_eq!(report.decisions[0].category, Category::ToDelete);
}

#[tokio::test]
async fn test_no_resolution_mode_never_probes() {
    let libs = libraries();
    let src = libs.a.join("Heat (1995) {tvdb-2}.mkv");
    let reference = libs.b.join("Heat (1995) {tvdb-2}.mkv");
    sized_file(&src, MB);
    sized_file(&reference, 2 * MB);

    let probe = Arc::new(
        FakeProbe::default()
            .with(&src, 3840, 2160)
            .with(&reference, 640, 480),
    );
    let options = MigrateOptions {
        dry_run: true,
        prefer_resolution: false,
        ..Default::default()
    };
    let report = migrate(&libs.a, &libs.b, &libs.c, options, probe.clone())
        .await
        .unwrap();

    assert_eq!(report.decisions[0].category, Category::ToDelete);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_reference_is_skipped() {
    let libs = libraries();
    let src = libs.a.join("Lonely (2001) {tvdb-42}.mkv");
    sized_file(&src, MB);
    sized_file(&libs.b.join("Other (2002) {tvdb-43}.mkv"), MB);
    sized_file(&libs.a.join("untagged movie.mkv"), MB);

    let report = migrate(
        &libs.a,
        &libs.b,
        &libs.c,
        options(false),
        Arc::new(FakeProbe::default()),
    )
    .await
    .unwrap();

    assert!(report.decisions.is_empty());
    assert_eq!(report.summary.done, 0);
    assert_eq!(report.summary.skipped, 2);
    assert!(src.exists());
    assert!(fs::read_dir(&libs.c).unwrap().next().is_none());
}

#[tokio::test]
async fn test_show_episodes_keep_relative_layout() {
    let libs = libraries();
    let show = libs.a.join("Show (2020) {tvdb-1}");
    sized_file(&show.join("Season 01/Show (2020) - s01e01.mkv"), 2 * MB);
    sized_file(&show.join("Season 01/Show (2020) - s01e02.mkv"), MB);
    sized_file(&show.join("Season 01/Show (2020) - s01e09.mkv"), MB);
    sized_file(&show.join("Extras/behind the scenes.mkv"), MB);

    let reference = libs.b.join("S/Show (2020) {tvdb-1}");
    sized_file(&reference.join("S1/Show s01e01.mkv"), MB);
    sized_file(&reference.join("S1/Show s01e02-e03.mkv"), 2 * MB);

    let report = migrate(
        &libs.a,
        &libs.b,
        &libs.c,
        options(false),
        Arc::new(FakeProbe::default()),
    )
    .await
    .unwrap();

    let categories: Vec<_> = report
        .decisions
        .iter()
        .map(|d| (d.source.file_name().unwrap().to_string_lossy().to_string(), d.category))
        .collect();
    assert_eq!(
        categories,
        vec![
            ("Show (2020) - s01e01.mkv".to_string(), Category::GreaterFilesize),
            ("Show (2020) - s01e02.mkv".to_string(), Category::ToDelete),
            // No reference episode: reference size counts as 0
            ("Show (2020) - s01e09.mkv".to_string(), Category::GreaterFilesize),
        ]
    );
    assert!(report.decisions[2].describe().contains("B(name=<missing>)"));

    assert!(libs
        .c
        .join("greater-filesize/Show (2020) {tvdb-1}/Season 01/Show (2020) - s01e01.mkv")
        .exists());
    assert!(libs
        .c
        .join("to-delete/Show (2020) {tvdb-1}/Season 01/Show (2020) - s01e02.mkv")
        .exists());

    // The show directory itself is never moved; unparseable files stay put
    assert!(show.join("Extras/behind the scenes.mkv").exists());
    assert_eq!(report.summary.done, 3);
    assert_eq!(report.summary.skipped, 1);
}

#[tokio::test]
async fn test_dry_run_matches_real_run() {
    let libs = libraries();
    sized_file(&libs.a.join("M/Movie (2010) {tvdb-5}.mkv"), 3 * MB);
    sized_file(&libs.b.join("Movie (2010) {tvdb-5}.mkv"), MB);
    sized_file(&libs.a.join("Show (2020) {tvdb-6}/Season 02/Show - s02e01.mkv"), MB);
    sized_file(&libs.b.join("Show (2020) {tvdb-6}/Show - s02e01.mkv"), MB);

    let dry = migrate(
        &libs.a,
        &libs.b,
        &libs.c,
        options(true),
        Arc::new(FakeProbe::default()),
    )
    .await
    .unwrap();

    // Dry-run leaves the target untouched
    assert!(fs::read_dir(&libs.c).unwrap().next().is_none());
    assert!(libs.a.join("M/Movie (2010) {tvdb-5}.mkv").exists());

    let real = migrate(
        &libs.a,
        &libs.b,
        &libs.c,
        options(false),
        Arc::new(FakeProbe::default()),
    )
    .await
    .unwrap();

    assert_eq!(dry.decisions, real.decisions);
    assert_eq!(dry.summary, real.summary);
    assert!(dry.summary.output.iter().any(|l| l.starts_with("DECISION: ")));
    assert!(libs.c.join("greater-filesize/Movie (2010) {tvdb-5}.mkv").exists());
    assert!(libs
        .c
        .join("to-delete/Show (2020) {tvdb-6}/Season 02/Show - s02e01.mkv")
        .exists());
}

#[tokio::test]
async fn test_existing_destination_is_skipped_unless_overwrite() {
    let libs = libraries();
    let src = libs.a.join("Movie (2010) {tvdb-5}.mkv");
    sized_file(&src, 3 * MB);
    sized_file(&libs.b.join("Movie (2010) {tvdb-5}.mkv"), MB);
    let dst = libs.c.join("greater-filesize/Movie (2010) {tvdb-5}.mkv");
    sized_file(&dst, 1);

    let report = migrate(
        &libs.a,
        &libs.b,
        &libs.c,
        options(false),
        Arc::new(FakeProbe::default()),
    )
    .await
    .unwrap();
    assert_eq!(report.summary.skipped, 1);
    assert!(src.exists());

    let overwrite = MigrateOptions {
        overwrite: true,
        ..Default::default()
    };
    let report = migrate(
        &libs.a,
        &libs.b,
        &libs.c,
        overwrite,
        Arc::new(FakeProbe::default()),
    )
    .await
    .unwrap();
    assert_eq!(report.summary.done, 1);
    assert!(!src.exists());
    assert_eq!(fs::metadata(&dst).unwrap().len(), 3 * MB);
}

#[tokio::test]
async fn test_prefetch_pool_gives_same_decisions() {
    let libs = libraries();
    let mut probe = FakeProbe::default();
    for i in 1..=4 {
        let src = libs.a.join(format!("Movie {i} (2010) {{tvdb-{i}}}.mkv"));
        let reference = libs.b.join(format!("Movie {i} (2010) {{tvdb-{i}}}.mkv"));
        sized_file(&src, MB);
        sized_file(&reference, MB);
        probe = probe.with(&src, 1920, 1080).with(&reference, 1280, 720);
    }
    let probe = Arc::new(probe);

    let pooled = MigrateOptions {
        dry_run: true,
        threads: 4,
        ..Default::default()
    };
    let report = migrate(&libs.a, &libs.b, &libs.c, pooled, probe.clone())
        .await
        .unwrap();

    assert_eq!(report.decisions.len(), 4);
    assert!(report
        .decisions
        .iter()
        .all(|d| d.category == Category::BetterResolution));
    // Each path probed exactly once
    assert_eq!(probe.calls.load(Ordering::SeqCst), 8);
}

#[test]
fn test_plan_pairs_ids_across_kinds() {
    let libs = libraries();
    // Movie file whose id is only a folder in the reference
    sized_file(&libs.a.join("Title (2000) {tvdb-9}.mkv"), MB);
    sized_file(&libs.b.join("Title (2000) {tvdb-9}/Season 01/x s01e01.mkv"), MB);
    // Show folder whose id is only a file in the reference
    sized_file(&libs.a.join("Other (2003) {tvdb-11}/Season 01/z s01e01.mkv"), MB);
    sized_file(&libs.b.join("Other (2003) {tvdb-11}.mkv"), MB);
    // Same kind, with an unparseable episode
    sized_file(&libs.a.join("Show (2001) {tvdb-10}/notes.mkv"), MB);
    sized_file(&libs.b.join("Show (2001) {tvdb-10}/y s01e01.mkv"), MB);
    // Id absent from the reference
    sized_file(&libs.a.join("Lost (2004) {tvdb-12}.mkv"), MB);

    let source = index_tree(&libs.a).unwrap();
    let reference = index_tree(&libs.b).unwrap();
    let mut episodes = EpisodeIndexCache::new();
    let plan = plan_reconciliation(&source, &reference, &mut episodes);

    let mut candidates: Vec<_> = plan
        .candidates
        .iter()
        .map(|c| (c.tvdb_id.to_string(), c.reference.clone()))
        .collect();
    candidates.sort();
    assert_eq!(
        candidates,
        vec![("11".to_string(), None), ("9".to_string(), None)]
    );

    let mut skipped: Vec<_> = plan
        .skipped
        .iter()
        .map(|s| (s.title.clone(), s.reason))
        .collect();
    skipped.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        skipped,
        vec![
            ("10".to_string(), SkipReason::UnparseableEpisode),
            ("12".to_string(), SkipReason::NoReference),
        ]
    );
    assert_eq!(episodes.len(), 2);
}

#[tokio::test]
async fn test_movie_against_reference_folder_counts_as_missing() {
    let libs = libraries();
    let src = libs.a.join("John Wick (2014) {tvdb-155}.mp4");
    sized_file(&src, 2 * 1024);
    fs::create_dir_all(libs.b.join("John Wick (2014) {tvdb-155}")).unwrap();
    let empty = libs.a.join("Empty (2015) {tvdb-156}.mp4");
    sized_file(&empty, 0);
    fs::create_dir_all(libs.b.join("Empty (2015) {tvdb-156}")).unwrap();

    let report = migrate(
        &libs.a,
        &libs.b,
        &libs.c,
        options(false),
        Arc::new(FakeProbe::default()),
    )
    .await
    .unwrap();

    assert_eq!(report.decisions.len(), 2);
    assert_eq!(report.decisions[0].category, Category::GreaterFilesize);
    assert!(report.decisions[0].describe().contains("B(name=<missing>)"));
    assert_eq!(report.decisions[1].category, Category::ToDelete);
    assert!(libs
        .c
        .join("greater-filesize/John Wick (2014) {tvdb-155}.mp4")
        .exists());
    assert!(libs.c.join("to-delete/Empty (2015) {tvdb-156}.mp4").exists());
    assert_eq!(report.summary.done, 2);
}
