// SYNOID Canvas Pipeline
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// image -> caption + color/emotion -> story -> narration -> frame -> video -> description
//
// Stages run strictly in order, once each. Any failure except story
// generation stops the run and is reported tagged with its stage. The
// narration key is resolved before the first stage, and a failed run's
// workspace is removed.

use crate::agent::caption::{self, Captioner};
use crate::agent::compositor::{FrameCompositor, FRAME_FILE_NAME};
use crate::agent::description::auto_generate_description;
use crate::agent::emotion::{infer_emotion, Emotion};
use crate::agent::muxer::{FfmpegMuxer, VideoMuxer, VIDEO_FILE_NAME};
use crate::agent::palette::{ColorSampler, QuantizingSampler, Rgb};
use crate::agent::story::{GeminiStoryteller, StoryOutcome, Storyteller};
use crate::agent::voice::{SpeechRequest, TtsProvider, VoiceStudio};
use crate::config::{CanvasConfig, DEFAULT_LANGUAGE, DEFAULT_SPEECHIFY_MODEL, DEFAULT_VOICE};
use crate::error::{CanvasError, Result, Stage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Mount point of the output directory on the HTTP surface.
pub const OUTPUTS_ROUTE: &str = "/outputs";

/// Narration options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSettings {
    pub provider: TtsProvider,
    pub voice_id: String,
    pub language: String,
    pub model: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            provider: TtsProvider::Speechify,
            voice_id: DEFAULT_VOICE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            model: DEFAULT_SPEECHIFY_MODEL.to_string(),
        }
    }
}

fn given(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl VoiceSettings {
    /// Fails on an unknown `TTS_PROVIDER`.
    pub fn from_config(cfg: &CanvasConfig) -> Result<Self> {
        Ok(Self {
            provider: cfg.tts_provider.parse()?,
            voice_id: cfg.voice_id.clone(),
            language: cfg.language.clone(),
            model: cfg.tts_model.clone(),
        })
    }

    /// Copy with any provided override applied. Blank overrides are ignored,
    /// an unknown provider name is a config error.
    pub fn with_overrides(
        &self,
        provider: Option<&str>,
        voice_id: Option<&str>,
        language: Option<&str>,
        model: Option<&str>,
    ) -> Result<Self> {
        let pick = |value: Option<&str>, fallback: &String| {
            given(value)
                .map(str::to_string)
                .unwrap_or_else(|| fallback.clone())
        };
        let provider = match given(provider) {
            Some(name) => name.parse()?,
            None => self.provider,
        };
        Ok(Self {
            provider,
            voice_id: pick(voice_id, &self.voice_id),
            language: pick(language, &self.language),
            model: pick(model, &self.model),
        })
    }
}

/// Per-run directory `<output_dir>/runs/<uuid>/`.
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    pub run_id: Uuid,
    pub dir: PathBuf,
}

impl RunWorkspace {
    pub async fn open(output_dir: &Path) -> Result<Self> {
        let run_id = Uuid::new_v4();
        let dir = output_dir.join("runs").join(run_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { run_id, dir })
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// URL of a file in this workspace under `OUTPUTS_ROUTE`.
    pub fn url(&self, path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}/runs/{}/{}", OUTPUTS_ROUTE, self.run_id, file_name)
    }

    pub async fn discard(&self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            warn!("[PIPELINE] Could not remove {:?}: {}", self.dir, e);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineArtifacts {
    pub run_id: Uuid,
    pub caption: String,
    pub color: Rgb,
    pub emotion: Emotion,
    pub story: StoryOutcome,
    pub audio_path: PathBuf,
    pub frame_path: PathBuf,
    pub video_path: PathBuf,
    pub audio_url: String,
    pub frame_url: String,
    pub video_url: String,
    pub description: String,
}

pub struct StoryPipeline {
    captioner: Arc<dyn Captioner>,
    sampler: Arc<dyn ColorSampler>,
    storyteller: Arc<dyn Storyteller>,
    studio: VoiceStudio,
    compositor: FrameCompositor,
    muxer: Arc<dyn VideoMuxer>,
    voice: VoiceSettings,
    output_dir: PathBuf,
}

impl StoryPipeline {
    pub fn new(
        captioner: Arc<dyn Captioner>,
        sampler: Arc<dyn ColorSampler>,
        storyteller: Arc<dyn Storyteller>,
        studio: VoiceStudio,
        muxer: Arc<dyn VideoMuxer>,
    ) -> Self {
        let defaults = CanvasConfig::default();
        Self {
            captioner,
            sampler,
            storyteller,
            studio,
            compositor: FrameCompositor::default(),
            muxer,
            voice: VoiceSettings::default(),
            output_dir: defaults.output_dir,
        }
    }

    /// Production wiring. Fails fast on missing caption/story credentials
    /// and on an unknown TTS provider.
    pub fn from_config(cfg: &CanvasConfig) -> Result<Self> {
        Ok(Self::new(
            caption::from_config(cfg)?,
            Arc::new(QuantizingSampler {
                quality: cfg.color_quality,
            }),
            Arc::new(GeminiStoryteller::from_config(cfg)?),
            VoiceStudio::from_config(cfg),
            Arc::new(FfmpegMuxer),
        )
        .compositor(FrameCompositor::with_font(cfg.font_path.clone()))
        .voice(VoiceSettings::from_config(cfg)?)
        .output_dir(cfg.output_dir.clone()))
    }

    pub fn compositor(mut self, compositor: FrameCompositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn voice(mut self, voice: VoiceSettings) -> Self {
        self.voice = voice;
        self
    }

    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn voice_settings(&self) -> &VoiceSettings {
        &self.voice
    }

    pub fn output_path(&self) -> &Path {
        &self.output_dir
    }

    pub async fn run(&self, image_path: &Path) -> Result<PipelineArtifacts> {
        self.run_with_voice(image_path, &self.voice).await
    }

    /// Checks that need no network. Returns the narration key for `voice`.
    pub fn preflight(&self, voice: &VoiceSettings) -> Result<String> {
        self.studio
            .resolve_key(voice.provider, None)
            .map_err(|e| CanvasError::at(Stage::Speech, e))
    }

    pub async fn run_with_voice(
        &self,
        image_path: &Path,
        voice: &VoiceSettings,
    ) -> Result<PipelineArtifacts> {
        let api_key = self.preflight(voice)?;
        let workspace = RunWorkspace::open(&self.output_dir).await?;
        info!("[PIPELINE] Run {} started for {:?}", workspace.run_id, image_path);

        let result = self.execute(image_path, voice, &api_key, &workspace).await;
        if let Err(e) = &result {
            warn!("[PIPELINE] Run {} failed: {}", workspace.run_id, e);
            workspace.discard().await;
        }
        result
    }

    async fn execute(
        &self,
        image_path: &Path,
        voice: &VoiceSettings,
        api_key: &str,
        workspace: &RunWorkspace,
    ) -> Result<PipelineArtifacts> {
        info!("[PIPELINE] Captioning...");
        let caption = self
            .captioner
            .caption(image_path)
            .await
            .map_err(|e| CanvasError::at(Stage::Caption, e))?;
        info!("[PIPELINE] Caption: {}", caption);

        info!("[PIPELINE] Detecting emotion...");
        let sampler = self.sampler.clone();
        let sample_path = image_path.to_path_buf();
        let color = tokio::task::spawn_blocking(move || sampler.dominant_color(&sample_path))
            .await
            .map_err(CanvasError::from)
            .and_then(|sampled| sampled)
            .map_err(|e| CanvasError::at(Stage::Emotion, e))?;
        let emotion = infer_emotion(color);
        info!("[PIPELINE] Dominant color {:?} reads as {}", color, emotion);

        info!("[PIPELINE] Generating story...");
        let story = self.storyteller.tell(&caption, emotion).await;
        if story.is_placeholder() {
            warn!("[PIPELINE] Continuing with placeholder story");
        } else {
            info!("[PIPELINE] Story ready");
        }

        info!("[PIPELINE] Generating voice with {}...", voice.provider);
        let request = SpeechRequest::new(story.text(), voice.voice_id.as_str())
            .language(voice.language.as_str())
            .model(voice.model.as_str());
        let audio_path = self
            .studio
            .synthesize_with(voice.provider, &request, Some(api_key), &workspace.dir)
            .await
            .map_err(|e| CanvasError::at(Stage::Speech, e))?;
        info!("[PIPELINE] Narration: {:?}", audio_path);

        info!("[PIPELINE] Composing frame...");
        let frame_path = self
            .compositor
            .compose(image_path, story.text(), &workspace.path(FRAME_FILE_NAME))
            .await
            .map_err(|e| CanvasError::at(Stage::Frame, e))?;

        info!("[PIPELINE] Rendering video...");
        let video_path = self
            .muxer
            .mux(&frame_path, &audio_path, &workspace.path(VIDEO_FILE_NAME))
            .await
            .map_err(|e| CanvasError::at(Stage::Video, e))?;
        info!("[PIPELINE] Video: {:?}", video_path);

        let description = auto_generate_description(&caption, emotion.label(), story.text());
        info!("[PIPELINE] Run {} complete", workspace.run_id);

        Ok(PipelineArtifacts {
            run_id: workspace.run_id,
            caption,
            color,
            emotion,
            story,
            audio_url: workspace.url(&audio_path),
            frame_url: workspace.url(&frame_path),
            video_url: workspace.url(&video_path),
            audio_path,
            frame_path,
            video_path,
            description,
        })
    }
}
