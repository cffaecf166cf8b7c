//! FFprobe preflight check.

use super::CheckResult;
use crate::services::ffprobe;

/// Check if ffprobe is installed.
pub fn check(program: &str) -> CheckResult {
    if ffprobe::is_installed(program, "-version") {
        match ffprobe::get_version(program, "-version") {
            Ok(version) => CheckResult::ok("ffprobe", &format!("installed ({})", version)),
            Err(_) => CheckResult::ok("ffprobe", "installed"),
        }
    } else {
        CheckResult::fail(
            "ffprobe",
            "not found",
            "Install FFmpeg: sudo apt install ffmpeg (or run with --no-resolution)",
        )
    }
}
