// SYNOID Caption Provider
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Hands an image to a hosted vision model and returns a short caption.
// One request per image; failures propagate to the caller.

use crate::config::{CanvasConfig, CaptionBackend};
use crate::error::{CanvasError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const CAPTION_PROMPT: &str =
    "Describe this drawing in one short sentence, like a caption. Reply with the caption only.";

#[async_trait]
pub trait Captioner: Send + Sync {
    async fn caption(&self, image_path: &Path) -> Result<String>;
}

/// Build the captioner selected in config.
pub fn from_config(cfg: &CanvasConfig) -> Result<Arc<dyn Captioner>> {
    match cfg.caption_backend {
        CaptionBackend::Ollama => Ok(Arc::new(OllamaCaptioner::new(
            &cfg.ollama_url,
            cfg.caption_model(),
        ))),
        CaptionBackend::HuggingFace => {
            let token = cfg.hf_api_token.clone().ok_or_else(|| {
                CanvasError::Config(
                    "HF_API_TOKEN must be set to caption with the HuggingFace backend".to_string(),
                )
            })?;
            Ok(Arc::new(HuggingFaceCaptioner::new(
                &cfg.hf_api_url,
                cfg.caption_model(),
                token,
            )))
        }
    }
}

/// Vision-language model served by Ollama (`/api/generate` with base64 images).
pub struct OllamaCaptioner {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

impl OllamaCaptioner {
    pub fn new(api_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Captioner for OllamaCaptioner {
    async fn caption(&self, image_path: &Path) -> Result<String> {
        info!("[CAPTION] Asking {} to describe {:?}", self.model, image_path);

        let bytes = tokio::fs::read(image_path).await?;
        let body = serde_json::json!({
            "model": self.model,
            "prompt": CAPTION_PROMPT,
            "images": [STANDARD.encode(&bytes)],
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.api_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CanvasError::Provider(format!(
                "Ollama caption request failed ({}): {}",
                status, text
            )));
        }

        let json: serde_json::Value = response.json().await?;
        let caption = json
            .get("response")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CanvasError::Provider("Ollama reply had no 'response' field".into()))?
            .trim()
            .to_string();

        info!("[CAPTION] {}", caption);
        Ok(caption)
    }
}

/// Image-to-text model on the HuggingFace Inference API (raw image body, bearer token).
pub struct HuggingFaceCaptioner {
    client: reqwest::Client,
    api_url: String,
    model: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl HuggingFaceCaptioner {
    pub fn new(api_url: &str, model: &str, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token,
        }
    }
}

/// Pull the caption out of an Inference API image-to-text reply.
pub fn parse_inference_caption(body: &str) -> Result<String> {
    let parsed: Vec<GeneratedText> = serde_json::from_str(body)?;
    parsed
        .into_iter()
        .next()
        .map(|g| g.generated_text.trim().to_string())
        .ok_or_else(|| CanvasError::Provider("caption reply was an empty list".to_string()))
}

#[async_trait]
impl Captioner for HuggingFaceCaptioner {
    async fn caption(&self, image_path: &Path) -> Result<String> {
        info!("[CAPTION] Sending {:?} to {}", image_path, self.model);

        let bytes = tokio::fs::read(image_path).await?;
        let response = self
            .client
            .post(format!("{}/models/{}", self.api_url, self.model))
            .bearer_auth(&self.token)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CanvasError::Provider(format!(
                "HuggingFace caption request failed ({}): {}",
                status, text
            )));
        }

        let caption = parse_inference_caption(&text)?;
        info!("[CAPTION] {}", caption);
        Ok(caption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inference_caption() {
        let body = r#"[{"generated_text": "  a drawing of a smiling dog "}]"#;
        assert_eq!(parse_inference_caption(body).unwrap(), "a drawing of a smiling dog");
    }

    #[test]
    fn test_parse_inference_caption_errors() {
        assert!(matches!(
            parse_inference_caption("[]"),
            Err(CanvasError::Provider(_))
        ));
        assert!(matches!(
            parse_inference_caption(r#"{"error": "loading"}"#),
            Err(CanvasError::Json(_))
        ));
    }

    #[test]
    fn test_huggingface_backend_requires_token() {
        let cfg = CanvasConfig::from_lookup(|key| match key {
            "CAPTION_BACKEND" => Some("huggingface".to_string()),
            _ => None,
        });
        let err = from_config(&cfg).err().unwrap();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_missing_image_is_io_error() {
        let captioner = OllamaCaptioner::new("http://127.0.0.1:9", "llava");
        let err = captioner
            .caption(Path::new("no/such/drawing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, CanvasError::Io(_)));
    }
}
