//! Video duration probing via ffprobe

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::types::UNKNOWN_DURATION;

/// Duration units reported by the probe (microseconds, ffmpeg's AV_TIME_BASE)
pub const AV_TIME_BASE: i64 = 1_000_000;

/// Container duration in `AV_TIME_BASE` units, 0 when it cannot be determined
pub async fn probe_duration(ffprobe: &str, path: &Path) -> i64 {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await;

    let output = match output {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::debug!(file = %path.display(), code = ?output.status.code(), "ffprobe failed");
            return 0;
        }
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "could not run {}", ffprobe);
            return 0;
        }
    };

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Formatted duration of a video file, "00:00:00.00" when probing fails
pub async fn formatted_duration(ffprobe: &str, path: &Path) -> String {
    match probe_duration(ffprobe, path).await {
        0 => UNKNOWN_DURATION.to_string(),
        duration => format_timestamp(duration),
    }
}

/// ffprobe prints the duration in seconds, e.g. "195.404000"
fn parse_probe_output(stdout: &str) -> i64 {
    match stdout.trim().parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
            (seconds * AV_TIME_BASE as f64).round() as i64
        }
        _ => 0,
    }
}

/// Format `AV_TIME_BASE` units as "HH:MM:SS.cc", truncating at every level
pub fn format_timestamp(duration: i64) -> String {
    let duration = duration.max(0);
    let total_seconds = duration / AV_TIME_BASE;

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let centis = (duration % AV_TIME_BASE) / (AV_TIME_BASE / 100);

    format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}
