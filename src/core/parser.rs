//! Season and episode parsing.
//!
//! Recognises:
//! - Standard tags: `S01E02`, `s1e2`, double episodes `S01E02-E03`
//! - German phrasings: `Episode 12 ... Staffel 2` and `Staffel 2 ... Episode 12`
//! - Season folders: any name with exactly one run of digits

use crate::models::media::{EpisodeTag, SeasonFolder};
use regex::Regex;
use std::sync::LazyLock;

static RE_EPISODE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)s(\d{1,2})e(\d{1,2})(?:-e(\d{1,2}))?").expect("Invalid episode tag regex")
});

static RE_GERMAN_EPISODE_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Episode\s+(\d+)\D+Staffel\s+(\d+)").expect("Invalid german episode regex")
});

static RE_GERMAN_SEASON_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Staffel\s+(\d+)\D+Episode\s+(\d+)").expect("Invalid german season regex")
});

static RE_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid digit regex"));

fn capture_number(caps: &regex::Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

/// Parse an `sXXeYY[-eZZ]` tag from text.
///
/// An end episode lower than the start episode is dropped, leaving a single episode.
pub fn parse_episode_tag(text: &str) -> Option<EpisodeTag> {
    let caps = RE_EPISODE_TAG.captures(text)?;
    let season = capture_number(&caps, 1)?;
    let episode = capture_number(&caps, 2)?;
    let episode_end = match caps.get(3) {
        Some(m) => Some(m.as_str().parse::<u32>().ok()?),
        None => None,
    }
    .filter(|end| *end >= episode);

    Some(EpisodeTag {
        season,
        episode,
        episode_end,
    })
}

/// Canonical lowercase tag for text, e.g. `"S1E2"` becomes `"s01e02"`.
pub fn normalize_episode_tag(text: &str) -> Option<String> {
    parse_episode_tag(text).map(|tag| tag.to_string())
}

/// `(season, episode)` from the standard grammar; double episodes yield their first episode.
pub fn parse_season_episode(text: &str) -> Option<(u32, u32)> {
    parse_episode_tag(text).map(|tag| tag.key())
}

/// `(season, episode)` from the standard grammar, then the German phrasings.
pub fn parse_season_episode_loose(text: &str) -> Option<(u32, u32)> {
    if let Some(key) = parse_season_episode(text) {
        return Some(key);
    }

    if let Some(caps) = RE_GERMAN_EPISODE_FIRST.captures(text) {
        let episode = capture_number(&caps, 1)?;
        let season = capture_number(&caps, 2)?;
        return Some((season, episode));
    }

    if let Some(caps) = RE_GERMAN_SEASON_FIRST.captures(text) {
        let season = capture_number(&caps, 1)?;
        let episode = capture_number(&caps, 2)?;
        return Some((season, episode));
    }

    None
}

/// Classify a directory name.
///
/// Exactly one digit run means a season folder. Zero runs (plain show titles)
/// and two or more (titles with a year and an id) do not.
pub fn classify_season_dir(name: &str) -> SeasonFolder {
    let mut runs = RE_DIGIT_RUN.find_iter(name);
    match (runs.next(), runs.next()) {
        (Some(run), None) => run
            .as_str()
            .parse()
            .map(SeasonFolder::Season)
            .unwrap_or(SeasonFolder::NotSeason),
        _ => SeasonFolder::NotSeason,
    }
}

/// Check whether a directory name looks like a season folder.
pub fn is_season_like(name: &str) -> bool {
    matches!(classify_season_dir(name), SeasonFolder::Season(_))
}

/// Season number of a season-like directory name.
pub fn season_number(name: &str) -> Option<u32> {
    classify_season_dir(name).number()
}
