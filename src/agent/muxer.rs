// SYNOID Muxer Module
// Still frame + narration -> H.264/AAC MP4 with a fade at each end
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::agent::media_tools::{probe_duration, safe_arg_path};
use crate::error::{CanvasError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info};

pub const VIDEO_FILE_NAME: &str = "final_video.mp4";
pub const FADE_SECS: f64 = 1.0;
pub const FRAME_RATE: u32 = 24;

#[async_trait]
pub trait VideoMuxer: Send + Sync {
    /// Render `frame` for the full length of `audio` into `output`.
    async fn mux(&self, frame: &Path, audio: &Path, output: &Path) -> Result<PathBuf>;
}

/// Fade in over the first second, fade out over the last, clamped for short clips.
pub fn fade_filter(duration: f64) -> String {
    let fade_out_start = (duration - FADE_SECS).max(0.0);
    format!(
        "fade=t=in:st=0:d={fade},fade=t=out:st={start:.3}:d={fade},format=yuv420p",
        fade = FADE_SECS,
        start = fade_out_start
    )
}

/// Full ffmpeg argument list for one mux. Pure, so it can be checked without ffmpeg.
pub fn mux_args(frame: &Path, audio: &Path, output: &Path, duration: f64) -> Vec<OsString> {
    let duration_arg = format!("{:.3}", duration);
    let rate_arg = FRAME_RATE.to_string();
    let filter = fade_filter(duration);

    let mut args: Vec<OsString> = ["-y", "-loop", "1", "-i"].map(OsString::from).to_vec();
    args.push(safe_arg_path(frame));
    args.push("-i".into());
    args.push(safe_arg_path(audio));
    args.extend(
        [
            "-t",
            duration_arg.as_str(),
            "-r",
            rate_arg.as_str(),
            "-vf",
            filter.as_str(),
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-shortest",
        ]
        .map(OsString::from),
    );
    args.push(safe_arg_path(output));
    args
}

/// Drives the ffmpeg CLI.
#[derive(Debug, Clone, Default)]
pub struct FfmpegMuxer;

#[async_trait]
impl VideoMuxer for FfmpegMuxer {
    async fn mux(&self, frame: &Path, audio: &Path, output: &Path) -> Result<PathBuf> {
        let duration = probe_duration(audio).await?;
        info!(
            "[MUXER] Rendering {:.2}s at {} fps -> {:?}",
            duration, FRAME_RATE, output
        );

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let result = Command::new("ffmpeg")
            .kill_on_drop(true)
            .args(mux_args(frame, audio, output, duration))
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            error!("[MUXER] FFmpeg exited with {}", result.status);
            return Err(CanvasError::Ffmpeg(stderr.trim().to_string()));
        }

        info!("[MUXER] Final output: {:?}", output);
        Ok(output.to_path_buf())
    }
}
