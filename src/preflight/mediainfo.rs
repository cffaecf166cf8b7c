//! MediaInfo preflight check.

use super::CheckResult;
use crate::services::ffprobe;

/// Check if mediainfo is installed.
pub fn check(program: &str) -> CheckResult {
    if ffprobe::is_installed(program, "--Version") {
        match ffprobe::get_version(program, "--Version") {
            Ok(version) => CheckResult::ok("mediainfo", &format!("installed ({})", version)),
            Err(_) => CheckResult::ok("mediainfo", "installed"),
        }
    } else {
        CheckResult::fail(
            "mediainfo",
            "not found",
            "Install MediaInfo: sudo apt install mediainfo",
        )
    }
}
