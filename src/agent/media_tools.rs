// SYNOID Media Tools - FFmpeg / FFprobe helpers
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::error::{CanvasError, Result};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Keep a path from being read as an option flag by ffmpeg/ffprobe.
pub fn safe_arg_path(path: &Path) -> OsString {
    if path.to_string_lossy().starts_with('-') {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

/// Container duration in seconds, read from the header with ffprobe.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = tokio::time::timeout(
        PROBE_TIMEOUT,
        Command::new("ffprobe")
            .kill_on_drop(true)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(safe_arg_path(path))
            .output(),
    )
    .await
    .map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::TimedOut, "ffprobe duration check timed out")
    })??;

    if !output.status.success() {
        return Err(CanvasError::Ffmpeg(format!(
            "ffprobe could not read {:?}: {}",
            path,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let duration = parse_duration(&raw).ok_or_else(|| {
        CanvasError::Ffmpeg(format!(
            "Failed to parse duration from ffprobe output: {:?}",
            raw.trim()
        ))
    })?;
    debug!("[MUXER] {:?} runs {:.3}s", path, duration);
    Ok(duration)
}

fn parse_duration(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// True if `<tool> -version` runs and exits cleanly.
pub async fn tool_available(tool: &str) -> bool {
    let probe = Command::new(tool)
        .kill_on_drop(true)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();

    matches!(
        tokio::time::timeout(PROBE_TIMEOUT, probe).await,
        Ok(Ok(status)) if status.success()
    )
}

/// Both ffmpeg and ffprobe are on PATH.
pub async fn ffmpeg_available() -> bool {
    tool_available("ffmpeg").await && tool_available("ffprobe").await
}
