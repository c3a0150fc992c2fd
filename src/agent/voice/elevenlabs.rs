// SYNOID Voice Studio - ElevenLabs Backend
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::agent::voice::tts::{SpeechBackend, SpeechRequest, TtsProvider};
use crate::error::{CanvasError, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

const OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Streams MP3 bytes back from `/v1/text-to-speech/<voice>`.
/// Language and model on the request are ignored; the model is fixed per backend.
pub struct ElevenLabsBackend {
    client: reqwest::Client,
    api_url: String,
    model_id: String,
}

impl ElevenLabsBackend {
    pub fn new(api_url: &str, model_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            model_id: model_id.to_string(),
        }
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.api_url, voice_id)
    }
}

#[async_trait]
impl SpeechBackend for ElevenLabsBackend {
    fn provider(&self) -> TtsProvider {
        TtsProvider::ElevenLabs
    }

    async fn render(&self, request: &SpeechRequest, api_key: &str) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .post(self.endpoint(&request.voice_id))
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", api_key)
            .json(&json!({
                "text": request.text,
                "model_id": self.model_id,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CanvasError::Provider(format!(
                "ElevenLabs request failed ({}): {}",
                status, text
            )));
        }

        let mut audio = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            audio.extend_from_slice(&chunk);
        }
        debug!("[TTS] ElevenLabs streamed {} bytes", audio.len());

        if audio.is_empty() {
            return Err(CanvasError::Provider(
                "ElevenLabs returned an empty audio stream".to_string(),
            ));
        }
        Ok(audio)
    }
}
