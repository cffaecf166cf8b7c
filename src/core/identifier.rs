//! TVDB identifier extraction.

use crate::models::media::TvdbId;
use regex::Regex;
use std::sync::LazyLock;

/// `{tvdb-<digits>}` anywhere in a name, any case.
static RE_TVDB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{tvdb-(\d+)\}").expect("Invalid tvdb regex"));

/// The token plus surrounding whitespace, for stripping.
static RE_TVDB_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\{tvdb-\d+\}\s*").expect("Invalid tvdb suffix regex"));

/// Return the identifier embedded in a file or folder name.
///
/// `"John Wick (2014) {tvdb-155}.mp4"` yields `155`. Leading zeros are kept.
pub fn extract_tvdb_id(name: &str) -> Option<TvdbId> {
    RE_TVDB
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| TvdbId::new(m.as_str()))
}

/// Check whether a name carries an identifier token.
pub fn has_tvdb_id(name: &str) -> bool {
    RE_TVDB.is_match(name)
}

/// Remove every identifier token (and the whitespace around it), then trim.
///
/// `"Code Geass (2006) {tvdb-79525}"` becomes `"Code Geass (2006)"`.
pub fn strip_tvdb_suffix(name: &str) -> String {
    RE_TVDB_SUFFIX.replace_all(name, "").trim().to_string()
}
