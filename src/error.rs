//! Error types for plex-leon.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for plex-leon.
#[derive(Error, Debug)]
pub enum Error {
    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Rename failed: {0}")]
    RenameFailed(String),

    #[error("Merge failed: {0}")]
    MergeFailed(String),

    // Probe errors
    #[error("Metadata probe failed: {0}")]
    ProbeFailed(String),

    // Config errors
    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}
