// SYNOID Canvas Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Everything is sourced from the environment (optionally via .env).
// Credentials are never compiled in.

use crate::agent::voice::TtsProvider;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_VISION_MODEL: &str = "llava";
pub const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_HF_CAPTION_MODEL: &str = "Salesforce/blip-image-captioning-large";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_SPEECHIFY_API_URL: &str = "https://api.sws.speechify.com";
pub const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_monolingual_v1";
pub const DEFAULT_VOICE: &str = "scott";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_SPEECHIFY_MODEL: &str = "simba-english";
pub const DEFAULT_COLOR_QUALITY: u32 = 1;

/// Which hosted captioning model to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionBackend {
    Ollama,
    HuggingFace,
}

impl CaptionBackend {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ollama" => Some(CaptionBackend::Ollama),
            "huggingface" | "hf" => Some(CaptionBackend::HuggingFace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CanvasConfig {
    pub output_dir: PathBuf,
    pub caption_backend: CaptionBackend,
    pub ollama_url: String,
    pub caption_model: Option<String>,
    pub hf_api_url: String,
    pub hf_api_token: Option<String>,
    pub gemini_api_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Raw provider flag; parsed into a `TtsProvider` when the pipeline is built.
    pub tts_provider: String,
    pub voice_id: String,
    pub language: String,
    pub tts_model: String,
    pub speechify_api_url: String,
    pub speechify_api_key: Option<String>,
    pub elevenlabs_api_url: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_model: String,
    pub font_path: Option<PathBuf>,
    pub color_quality: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl CanvasConfig {
    /// Load from process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let caption_backend = get("CAPTION_BACKEND")
            .and_then(|v| CaptionBackend::parse(&v))
            .unwrap_or(CaptionBackend::Ollama);

        let color_quality = get("COLOR_QUALITY")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|q| *q > 0)
            .unwrap_or(DEFAULT_COLOR_QUALITY);

        Self {
            output_dir: PathBuf::from(
                get("CANVAS_OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            ),
            caption_backend,
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            caption_model: get("CAPTION_MODEL"),
            hf_api_url: get("HF_API_URL").unwrap_or_else(|| DEFAULT_HF_API_URL.to_string()),
            hf_api_token: get("HF_API_TOKEN"),
            gemini_api_url: get("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            tts_provider: get("TTS_PROVIDER").unwrap_or_else(|| TtsProvider::Speechify.to_string()),
            voice_id: get("TTS_VOICE").unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            language: get("TTS_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            tts_model: get("TTS_MODEL").unwrap_or_else(|| DEFAULT_SPEECHIFY_MODEL.to_string()),
            speechify_api_url: get("SPEECHIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_SPEECHIFY_API_URL.to_string()),
            speechify_api_key: get(TtsProvider::Speechify.api_key_env()),
            elevenlabs_api_url: get("ELEVENLABS_API_URL")
                .unwrap_or_else(|| DEFAULT_ELEVENLABS_API_URL.to_string()),
            elevenlabs_api_key: get(TtsProvider::ElevenLabs.api_key_env()),
            elevenlabs_model: get("ELEVENLABS_MODEL")
                .unwrap_or_else(|| DEFAULT_ELEVENLABS_MODEL.to_string()),
            font_path: get("FONT_PATH").map(PathBuf::from),
            color_quality,
        }
    }

    /// Caption model name for the selected backend.
    pub fn caption_model(&self) -> &str {
        match (&self.caption_model, self.caption_backend) {
            (Some(model), _) => model,
            (None, CaptionBackend::Ollama) => DEFAULT_OLLAMA_VISION_MODEL,
            (None, CaptionBackend::HuggingFace) => DEFAULT_HF_CAPTION_MODEL,
        }
    }
}
