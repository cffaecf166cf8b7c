//! Integration tests for the season and episode renamers.

use plex_leon::core::episode_renamer::{plan_episode_renames, rename_episodes};
use plex_leon::core::season_renamer::{plan_season_renames, rename_seasons};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PREFIX: &str = "plexleon_";

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, path.to_string_lossy().as_bytes()).unwrap();
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// ========== SEASON RENAMER ==========

#[test]
fn test_season_folders_are_canonicalised() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let show = root.join("Show (2020) {tvdb-1}");
    touch(&show.join("season 1/a.mkv"));
    touch(&show.join("Staffel 2/b.mkv"));
    touch(&show.join("Season 03/c.mkv"));
    touch(&show.join("Extras/d.mkv"));
    touch(&show.join(".season 4/e.mkv"));

    let summary = rename_seasons(root, PREFIX, false).unwrap();

    assert_eq!(
        names(&show),
        vec![".season 4", "Extras", "Season 01", "Season 02", "Season 03"]
    );
    assert!(show.join("Season 01/a.mkv").exists());
    assert_eq!(summary.done, 2);
    assert_eq!(summary.per_title["Show (2020) {tvdb-1}"].done, 2);
}

#[test]
fn test_top_level_folders_are_not_renamed() {
    let temp_dir = TempDir::new().unwrap();
    touch(&temp_dir.path().join("season 1/a.mkv"));

    let plan = plan_season_renames(temp_dir.path()).unwrap();

    assert!(plan.is_empty());
}

#[test]
fn test_nested_season_folders_apply_deepest_first() {
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show");
    touch(&show.join("part 1/disc 2/a.mkv"));

    let plan = plan_season_renames(temp_dir.path()).unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].from, show.join("part 1/disc 2"));
    assert_eq!(plan[1].from, show.join("part 1"));

    rename_seasons(temp_dir.path(), PREFIX, false).unwrap();

    assert!(show.join("Season 01/Season 02/a.mkv").exists());
}

#[test]
fn test_case_only_season_rename_merges() {
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show (2020) {tvdb-1}");
    touch(&show.join("season 01/Show - s01e01.mkv"));
    touch(&show.join("season 01/Show - s01e02.mkv"));
    touch(&show.join("Season 01/Show - s01e02.mkv"));

    let summary = rename_seasons(temp_dir.path(), PREFIX, false).unwrap();

    assert_eq!(summary.done, 1);
    assert_eq!(names(&show), vec!["Season 01"]);
    assert_eq!(
        names(&show.join("Season 01")),
        vec![".plexleon_conflicts", "Show - s01e01.mkv", "Show - s01e02.mkv"]
    );
    assert_eq!(
        names(&show.join("Season 01/.plexleon_conflicts")),
        vec!["Show - s01e02 (conflict).mkv"]
    );
}

#[test]
fn test_existing_target_skips_non_case_rename() {
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show");
    touch(&show.join("S1/a.mkv"));
    touch(&show.join("Season 01/b.mkv"));

    let summary = rename_seasons(temp_dir.path(), PREFIX, false).unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(names(&show), vec!["S1", "Season 01"]);
}

#[test]
fn test_season_dry_run_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show");
    touch(&show.join("season 1/a.mkv"));

    let summary = rename_seasons(temp_dir.path(), PREFIX, true).unwrap();

    assert_eq!(summary.done, 1);
    assert_eq!(names(&show), vec!["season 1"]);
}

#[test]
fn test_season_dry_run_prints_what_real_run_does() {
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show {tvdb-1}");
    touch(&show.join("Season 01x/e1.mkv"));
    touch(&show.join("Season 1/e1.mkv"));
    touch(&show.join("season 01/e1.mkv"));

    let dry = rename_seasons(temp_dir.path(), PREFIX, true).unwrap();
    assert_eq!(names(&show), vec!["Season 01x", "Season 1", "season 01"]);

    let real = rename_seasons(temp_dir.path(), PREFIX, false).unwrap();

    assert_eq!(dry.output, real.output);
    assert_eq!(dry, real);
    assert!(dry
        .output
        .contains(&format!("SKIP exists: {}", show.join("Season 01").display())));
    assert!(dry.output.iter().any(|l| l.starts_with("CONFLICT: ")));
    assert_eq!(names(&show), vec!["Season 01", "Season 1"]);
    assert_eq!(
        names(&show.join("Season 01/.plexleon_conflicts")),
        vec!["e1 (conflict).mkv"]
    );
}

#[test]
fn test_bucketed_show_folders_are_not_seasons() {
    let temp_dir = TempDir::new().unwrap();
    let bucket = temp_dir.path().join("A");
    touch(&bucket.join("Show {tvdb-5}/season 1/a.mkv"));

    let plan = plan_season_renames(temp_dir.path()).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].from, bucket.join("Show {tvdb-5}/season 1"));

    rename_seasons(temp_dir.path(), PREFIX, false).unwrap();

    assert_eq!(names(&bucket), vec!["Show {tvdb-5}"]);
    assert!(bucket.join("Show {tvdb-5}/Season 01/a.mkv").exists());
}

// ========== EPISODE RENAMER ==========

#[test]
fn test_episode_files_are_canonicalised() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let show = root.join("Code Geass (2006) {tvdb-79525}");
    touch(&show.join("Season 01/code.geass.S1E2.720p.mkv"));
    touch(&show.join("Code Geass S01E03-E04.mp4"));
    touch(&show.join("Season 01/trailer.mkv"));
    touch(&root.join("loose S01E01.mkv"));

    let summary = rename_episodes(root, PREFIX, false).unwrap();

    assert_eq!(summary.done, 2);
    assert_eq!(summary.per_title["Code Geass (2006)"].done, 2);
    assert!(show.join("Season 01/Code Geass (2006) - s01e02.mkv").exists());
    assert!(show.join("Code Geass (2006) - s01e03-e04.mp4").exists());
    assert!(show.join("Season 01/trailer.mkv").exists());
    assert!(root.join("loose S01E01.mkv").exists());
}

#[test]
fn test_episode_case_only_rename() {
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show (2020) {tvdb-1}");
    touch(&show.join("Show (2020) - S01E01.mkv"));

    rename_episodes(temp_dir.path(), PREFIX, false).unwrap();

    assert_eq!(names(&show), vec!["Show (2020) - s01e01.mkv"]);
}

#[test]
fn test_episode_existing_target_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show (2020) {tvdb-1}");
    touch(&show.join("Show (2020) - s01e01.mkv"));
    touch(&show.join("other name s01e01.mkv"));

    let plan = plan_episode_renames(temp_dir.path()).unwrap();
    assert_eq!(plan.len(), 1);

    let summary = rename_episodes(temp_dir.path(), PREFIX, false).unwrap();

    assert_eq!(summary.skipped, 1);
    assert!(show.join("other name s01e01.mkv").exists());
}

#[test]
fn test_year_only_show_folder_counts_as_season() {
    // "Show (2020)" has a single digit run, so its files belong to the root
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show (2020)");
    touch(&show.join("show.S01E01.mkv"));

    let plan = plan_episode_renames(temp_dir.path()).unwrap();

    assert!(plan.is_empty());
}

#[test]
fn test_episode_dry_run_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let show = temp_dir.path().join("Show (2020)");
    touch(&show.join("Season 1/show.s01e01.mkv"));

    let summary = rename_episodes(temp_dir.path(), PREFIX, true).unwrap();

    assert_eq!(summary.done, 1);
    assert_eq!(names(&show.join("Season 1")), vec!["show.s01e01.mkv"]);
}
