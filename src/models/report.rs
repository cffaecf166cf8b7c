//! Validation reports and per-run statistics.

use colored::Colorize;
use std::collections::BTreeMap;
use std::fmt;

/// Severity of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Error,
    Warn,
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLevel::Error => write!(f, "ERROR"),
            ValidationLevel::Warn => write!(f, "WARN"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub level: ValidationLevel,
    pub text: String,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.text)
    }
}

/// Findings for one show directory.
///
/// Any ERROR means the directory must be skipped as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub messages: Vec<ValidationMessage>,
}

impl ValidationReport {
    pub fn error<S: Into<String>>(&mut self, text: S) {
        self.messages.push(ValidationMessage {
            level: ValidationLevel::Error,
            text: text.into(),
        });
    }

    pub fn warn<S: Into<String>>(&mut self, text: S) {
        self.messages.push(ValidationMessage {
            level: ValidationLevel::Warn,
            text: text.into(),
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages
            .iter()
            .filter(|m| m.level == ValidationLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages
            .iter()
            .filter(|m| m.level == ValidationLevel::Warn)
    }

    /// True when no ERROR was recorded.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }
}

/// Counters for a single title (show or movie).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TitleStats {
    pub done: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Aggregated result of one run of a utility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items moved or renamed (or that would be, in dry-run).
    pub done: usize,
    /// Items left alone (no match, unparseable, destination exists).
    pub skipped: usize,
    /// Items whose filesystem operation failed.
    pub errors: usize,
    /// Per-title counters keyed by title name or identifier.
    pub per_title: BTreeMap<String, TitleStats>,
    /// Output lines printed during the run, in order.
    pub output: Vec<String>,
}

impl RunSummary {
    pub fn record_done(&mut self, title: &str) {
        self.done += 1;
        self.per_title.entry(title.to_string()).or_default().done += 1;
    }

    pub fn record_skipped(&mut self, title: &str) {
        self.skipped += 1;
        self.per_title.entry(title.to_string()).or_default().skipped += 1;
    }

    pub fn record_error(&mut self, title: &str) {
        self.errors += 1;
        self.per_title.entry(title.to_string()).or_default().errors += 1;
    }

    /// Print per-title counters, sorted case-insensitively.
    ///
    /// `done_label` is the verb shown for the `done` counter (e.g. "RENAMED").
    pub fn print_per_title(&self, done_label: &str) {
        let mut titles: Vec<_> = self.per_title.iter().collect();
        titles.sort_by_key(|(title, _)| title.to_lowercase());

        for (title, stats) in titles {
            let marker = if stats.errors > 0 {
                "[ERR]".red()
            } else if stats.skipped > 0 {
                "[WARN]".yellow()
            } else {
                "[OK]".green()
            };
            println!("{} {}", marker, title.bold());
            println!("    {} {}", format!("{}:", done_label).bold(), stats.done);
            println!("    {} {}", "SKIPPED:".bold(), stats.skipped);
            println!("    {} {}", "ERRORS:".bold(), stats.errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_validity() {
        let mut report = ValidationReport::default();
        report.warn("could not parse season/episode from filename: x.mkv");
        assert!(report.is_valid());
        report.error("missing tvdb id in show folder name: 'Show (2020)'");
        assert!(!report.is_valid());
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(
            report.messages[1].to_string(),
            "ERROR: missing tvdb id in show folder name: 'Show (2020)'"
        );
    }

    #[test]
    fn test_summary_counters() {
        let mut summary = RunSummary::default();
        summary.record_done("Show");
        summary.record_done("Show");
        summary.record_skipped("Other");
        summary.record_error("Show");

        assert_eq!(summary.done, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(
            summary.per_title["Show"],
            TitleStats {
                done: 2,
                skipped: 0,
                errors: 1
            }
        );
    }
}
