// SYNOID Voice Studio - Speechify Backend
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::agent::voice::catalogue::Voice;
use crate::agent::voice::tts::{SpeechBackend, SpeechRequest, TtsProvider};
use crate::config::{DEFAULT_LANGUAGE, DEFAULT_SPEECHIFY_MODEL};
use crate::error::{CanvasError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct SpeechOptions {
    loudness_normalization: bool,
    text_normalization: bool,
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    input: &'a str,
    voice_id: &'a str,
    audio_format: &'static str,
    language: &'a str,
    model: &'a str,
    options: SpeechOptions,
}

impl<'a> SpeechBody<'a> {
    fn from_request(request: &'a SpeechRequest) -> Self {
        Self {
            input: &request.text,
            voice_id: &request.voice_id,
            audio_format: "mp3",
            language: request.language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            model: request.model.as_deref().unwrap_or(DEFAULT_SPEECHIFY_MODEL),
            options: SpeechOptions {
                loudness_normalization: true,
                text_normalization: true,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpeechReply {
    audio_data: String,
}

/// Decode the base64 `audio_data` field of a `/v1/audio/speech` reply.
pub fn decode_speech_reply(body: &str) -> Result<Vec<u8>> {
    let reply: SpeechReply = serde_json::from_str(body)?;
    STANDARD
        .decode(reply.audio_data.trim())
        .map_err(|e| CanvasError::Provider(format!("Speechify audio_data is not base64: {}", e)))
}

pub struct SpeechifyBackend {
    client: reqwest::Client,
    api_url: String,
}

impl SpeechifyBackend {
    pub fn new(api_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SpeechBackend for SpeechifyBackend {
    fn provider(&self) -> TtsProvider {
        TtsProvider::Speechify
    }

    async fn render(&self, request: &SpeechRequest, api_key: &str) -> Result<Vec<u8>> {
        let body = SpeechBody::from_request(request);
        debug!("[TTS] Speechify {} / {}", body.language, body.model);

        let response = self
            .client
            .post(format!("{}/v1/audio/speech", self.api_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CanvasError::Provider(format!(
                "Speechify request failed ({}): {}",
                status, text
            )));
        }

        decode_speech_reply(&text)
    }

    async fn list_voices(&self, api_key: &str) -> Result<Vec<Voice>> {
        let voices: Vec<Voice> = self
            .client
            .get(format!("{}/v1/voices", self.api_url))
            .bearer_auth(api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!("[TTS] Speechify offers {} voices", voices.len());
        Ok(voices)
    }
}
