//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix used for transient swap names and the conflicts folder
    /// (`.<prefix>swap_<name>`, `.<prefix>conflicts`).
    pub swap_prefix: String,
    /// Lowercase extensions (without dot) treated as media files.
    pub media_extensions: Vec<String>,
    /// External probe configuration.
    pub probe: ProbeConfig,
    /// Defaults for the migrate command.
    pub migrate: MigrateConfig,
}

/// External probe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// ffprobe executable.
    pub ffprobe: String,
    /// mediainfo executable.
    pub mediainfo: String,
}

/// Migrate defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Probe pre-warm workers; 1 disables the pool.
    pub threads: usize,
    /// Compare resolutions before sizes.
    pub prefer_resolution: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            swap_prefix: "plexleon_".to_string(),
            media_extensions: [
                "mp4", "mkv", "avi", "mov", "m4v", "flv", "wmv", "mpg", "mpeg",
            ]
            .iter()
            .map(|e| e.to_string())
            .collect(),
            probe: ProbeConfig::default(),
            migrate: MigrateConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe: "ffprobe".to_string(),
            mediainfo: "mediainfo".to_string(),
        }
    }
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            prefer_resolution: true,
        }
    }
}

impl Config {
    /// Check whether a path has one of the configured media extensions.
    pub fn is_media_file(&self, path: &Path) -> bool {
        crate::utils::fs::get_extension(path)
            .map(|ext| self.media_extensions.iter().any(|m| *m == ext))
            .unwrap_or(false)
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plex_leon")
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> crate::Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from file, falling back to defaults.
pub fn load_config() -> Config {
    let config_path = dirs_config_path().join("config.toml");

    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match parse_config(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    "Ignoring config {}: {}",
                    config_path.display(),
                    e
                ),
            },
            Err(e) => tracing::warn!("Failed to read {}: {}", config_path.display(), e),
        }
    }

    Config::default()
}
