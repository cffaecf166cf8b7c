//! Video resolution probe backed by ffprobe and mediainfo.

use crate::models::config::ProbeConfig;
use crate::models::media::Resolution;
use crate::Result;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

/// Anything that can report the resolution of a video file.
///
/// Implementations must never fail: missing, unreadable or corrupt files yield `None`.
pub trait ResolutionProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Option<Resolution>;
}

/// FFprobe JSON output (only what we need).
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<Value>,
    height: Option<Value>,
}

/// Mediainfo JSON output.
#[derive(Debug, Deserialize)]
struct MediainfoOutput {
    media: Option<MediainfoMedia>,
}

#[derive(Debug, Deserialize)]
struct MediainfoMedia {
    #[serde(default)]
    track: Vec<MediainfoTrack>,
}

#[derive(Debug, Deserialize)]
struct MediainfoTrack {
    #[serde(rename = "@type")]
    track_type: Option<String>,
    #[serde(rename = "Width")]
    width: Option<Value>,
    #[serde(rename = "Height")]
    height: Option<Value>,
}

/// Probe that shells out to ffprobe, then falls back to mediainfo.
#[derive(Debug, Clone)]
pub struct MediaProbe {
    config: ProbeConfig,
}

impl MediaProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// ffprobe with JSON output.
    fn ffprobe_json(&self, path: &Path) -> Result<Option<Resolution>> {
        let stdout = run_tool(
            &self.config.ffprobe,
            &[
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "json",
            ],
            path,
        )?;
        parse_ffprobe_json(&stdout)
    }

    /// ffprobe with bare `width\nheight` output.
    fn ffprobe_text(&self, path: &Path) -> Result<Option<Resolution>> {
        let stdout = run_tool(
            &self.config.ffprobe,
            &[
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ],
            path,
        )?;
        Ok(parse_ffprobe_text(&stdout))
    }

    fn mediainfo_json(&self, path: &Path) -> Result<Option<Resolution>> {
        let stdout = run_tool(&self.config.mediainfo, &["--Output=JSON"], path)?;
        parse_mediainfo_json(&stdout)
    }
}

impl Default for MediaProbe {
    fn default() -> Self {
        Self::new(ProbeConfig::default())
    }
}

impl ResolutionProbe for MediaProbe {
    fn probe(&self, path: &Path) -> Option<Resolution> {
        if !path.is_file() {
            return None;
        }

        let attempts: [(&str, fn(&Self, &Path) -> Result<Option<Resolution>>); 3] = [
            ("ffprobe json", Self::ffprobe_json),
            ("ffprobe text", Self::ffprobe_text),
            ("mediainfo", Self::mediainfo_json),
        ];

        for (name, attempt) in attempts {
            match attempt(self, path) {
                Ok(Some(resolution)) => return Some(resolution),
                Ok(None) => {}
                Err(e) => tracing::debug!("{} failed for {}: {}", name, path.display(), e),
            }
        }

        None
    }
}

/// Run an external tool and return stdout on success.
fn run_tool(program: &str, args: &[&str], path: &Path) -> Result<String> {
    let output = Command::new(program).args(args).arg(path).output()?;

    if !output.status.success() {
        return Err(crate::Error::ProbeFailed(format!(
            "{} exited with {} for {}",
            program,
            output.status,
            path.display()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Check if an external tool is installed.
pub fn is_installed(program: &str, version_arg: &str) -> bool {
    Command::new(program)
        .arg(version_arg)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Get the first line of a tool's version output.
pub fn get_version(program: &str, version_arg: &str) -> Result<String> {
    let output = Command::new(program).arg(version_arg).output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().find(|l| !l.trim().is_empty()).unwrap_or("unknown");

    Ok(first_line.trim().to_string())
}

/// Best-effort dimension conversion.
///
/// Accepts integers, floats and strings such as `"1920"`, `"1 920 pixels"` or
/// `"1920.0"`. Non-positive values are treated as unknown.
fn parse_dimension(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))?,
        Value::String(s) => {
            let cleaned: String = s
                .replace('\u{a0}', " ")
                .split_whitespace()
                .take_while(|part| part.chars().next().is_some_and(|c| c.is_ascii_digit()))
                .collect();
            let digits: String = cleaned.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()?
        }
        _ => return None,
    };

    u32::try_from(number).ok().filter(|n| *n > 0)
}

fn resolution_from(width: Option<&Value>, height: Option<&Value>) -> Option<Resolution> {
    let width = parse_dimension(width?)?;
    let height = parse_dimension(height?)?;
    Some(Resolution::new(width, height))
}

fn parse_ffprobe_json(stdout: &str) -> Result<Option<Resolution>> {
    if stdout.trim().is_empty() {
        return Ok(None);
    }
    let output: FfprobeOutput = serde_json::from_str(stdout)?;
    Ok(output
        .streams
        .first()
        .and_then(|s| resolution_from(s.width.as_ref(), s.height.as_ref())))
}

fn parse_ffprobe_text(stdout: &str) -> Option<Resolution> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        return None;
    }
    let width = parse_dimension(&Value::String(lines[0].to_string()))?;
    let height = parse_dimension(&Value::String(lines[1].to_string()))?;
    Some(Resolution::new(width, height))
}

fn parse_mediainfo_json(stdout: &str) -> Result<Option<Resolution>> {
    if stdout.trim().is_empty() {
        return Ok(None);
    }
    let output: MediainfoOutput = serde_json::from_str(stdout)?;
    Ok(output.media.and_then(|media| {
        media
            .track
            .iter()
            .filter(|t| t.track_type.as_deref() == Some("Video"))
            .find_map(|t| resolution_from(t.width.as_ref(), t.height.as_ref()))
    }))
}
