// SYNOID Canvas Error Taxonomy
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::fmt;
use thiserror::Error;

/// Stages whose failure stops a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Caption,
    Emotion,
    Speech,
    Frame,
    Video,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Caption => "captioning",
            Stage::Emotion => "emotion detection",
            Stage::Speech => "voice generation",
            Stage::Frame => "frame composition",
            Stage::Video => "video generation",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Palette error: {0}")]
    Palette(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Something went wrong during {stage}: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<CanvasError>,
    },
}

impl CanvasError {
    /// Wrap a stage failure so the caller sees one generic error with the cause attached.
    pub fn at(stage: Stage, source: CanvasError) -> Self {
        CanvasError::Stage {
            stage,
            source: Box::new(source),
        }
    }

    /// True for validation failures that never reached the network.
    pub fn is_config(&self) -> bool {
        match self {
            CanvasError::Config(_) => true,
            CanvasError::Stage { source, .. } => source.is_config(),
            _ => false,
        }
    }

    /// Innermost cause, unwrapping stage tags.
    pub fn root(&self) -> &CanvasError {
        match self {
            CanvasError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CanvasError>;
