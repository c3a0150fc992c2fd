// SYNOID Voice Studio - Text-to-Speech Provider Dispatch
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// One entry point, two hosted backends. The provider is a closed enum;
// an unknown name or a missing key is rejected before any request is made.

use crate::agent::voice::catalogue::Voice;
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtsProvider {
    Speechify,
    ElevenLabs,
}

impl TtsProvider {
    pub const ALL: [TtsProvider; 2] = [TtsProvider::Speechify, TtsProvider::ElevenLabs];

    pub fn name(&self) -> &'static str {
        match self {
            TtsProvider::Speechify => "speechify",
            TtsProvider::ElevenLabs => "elevenlabs",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            TtsProvider::Speechify => "SPEECHIFY_API_KEY",
            TtsProvider::ElevenLabs => "ELEVENLABS_API_KEY",
        }
    }

    /// File name the synthesized clip is written under.
    pub fn output_file_name(&self) -> &'static str {
        match self {
            TtsProvider::Speechify => "speechify_audio.mp3",
            TtsProvider::ElevenLabs => "elevenlabs_audio.mp3",
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TtsProvider {
    type Err = CanvasError;

    fn from_str(raw: &str) -> Result<Self> {
        let wanted = raw.trim().to_lowercase();
        TtsProvider::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                CanvasError::Config(format!(
                    "Unsupported TTS provider: {}. Supported providers: speechify, elevenlabs",
                    raw
                ))
            })
    }
}

/// What to say and how. Backends ignore options they have no use for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
    pub language: Option<String>,
    pub model: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            language: None,
            model: None,
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Capability contract every hosted TTS backend fulfils.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    fn provider(&self) -> TtsProvider;

    /// One request, decoded audio bytes back.
    async fn render(&self, request: &SpeechRequest, api_key: &str) -> Result<Vec<u8>>;

    async fn list_voices(&self, _api_key: &str) -> Result<Vec<Voice>> {
        Err(CanvasError::Config(format!(
            "Listing voices is not supported for {}",
            self.provider()
        )))
    }
}

/// Fallback API keys per provider, normally loaded from the environment.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub speechify: Option<String>,
    pub elevenlabs: Option<String>,
}

impl Credentials {
    pub fn from_config(cfg: &CanvasConfig) -> Self {
        Self {
            speechify: cfg.speechify_api_key.clone(),
            elevenlabs: cfg.elevenlabs_api_key.clone(),
        }
    }

    pub fn get(&self, provider: TtsProvider) -> Option<&str> {
        match provider {
            TtsProvider::Speechify => self.speechify.as_deref(),
            TtsProvider::ElevenLabs => self.elevenlabs.as_deref(),
        }
    }
}

#[derive(Clone)]
pub struct VoiceStudio {
    speechify: Arc<dyn SpeechBackend>,
    elevenlabs: Arc<dyn SpeechBackend>,
    credentials: Credentials,
}

impl VoiceStudio {
    pub fn new(
        speechify: Arc<dyn SpeechBackend>,
        elevenlabs: Arc<dyn SpeechBackend>,
        credentials: Credentials,
    ) -> Self {
        Self {
            speechify,
            elevenlabs,
            credentials,
        }
    }

    pub fn from_config(cfg: &CanvasConfig) -> Self {
        use crate::agent::voice::{ElevenLabsBackend, SpeechifyBackend};
        Self::new(
            Arc::new(SpeechifyBackend::new(&cfg.speechify_api_url)),
            Arc::new(ElevenLabsBackend::new(
                &cfg.elevenlabs_api_url,
                &cfg.elevenlabs_model,
            )),
            Credentials::from_config(cfg),
        )
    }

    fn backend(&self, provider: TtsProvider) -> &Arc<dyn SpeechBackend> {
        match provider {
            TtsProvider::Speechify => &self.speechify,
            TtsProvider::ElevenLabs => &self.elevenlabs,
        }
    }

    /// Explicit key wins, then the provider's configured key. Blank counts as missing.
    pub fn resolve_key(&self, provider: TtsProvider, explicit: Option<&str>) -> Result<String> {
        explicit
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.credentials.get(provider))
            .filter(|k| !k.trim().is_empty())
            .map(|k| k.to_string())
            .ok_or_else(|| {
                CanvasError::Config(format!(
                    "{} API key not provided and {} environment variable not set",
                    provider,
                    provider.api_key_env()
                ))
            })
    }

    /// String-flag entry point: `provider` is matched case-insensitively.
    pub async fn synthesize(
        &self,
        provider: &str,
        request: &SpeechRequest,
        api_key: Option<&str>,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let provider: TtsProvider = provider.parse()?;
        self.synthesize_with(provider, request, api_key, out_dir)
            .await
    }

    /// Synthesize `request` with `provider` and write `<out_dir>/<provider>_audio.mp3`.
    pub async fn synthesize_with(
        &self,
        provider: TtsProvider,
        request: &SpeechRequest,
        api_key: Option<&str>,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let key = self.resolve_key(provider, api_key)?;

        info!(
            "[TTS] {} voice '{}' narrating {} chars",
            provider,
            request.voice_id,
            request.text.chars().count()
        );
        let audio = self.backend(provider).render(request, &key).await?;

        tokio::fs::create_dir_all(out_dir).await?;
        let output_path = out_dir.join(provider.output_file_name());
        tokio::fs::write(&output_path, &audio).await?;

        info!("[TTS] Wrote {} bytes -> {:?}", audio.len(), output_path);
        Ok(output_path)
    }

    /// Voices offered by `provider`. Only Speechify exposes a catalogue.
    pub async fn list_voices(&self, provider: &str, api_key: Option<&str>) -> Result<Vec<Voice>> {
        let provider: TtsProvider = provider.parse()?;
        let key = self.resolve_key(provider, api_key)?;
        self.backend(provider).list_voices(&key).await
    }
}
