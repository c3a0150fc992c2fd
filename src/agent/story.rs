// SYNOID Story Provider
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Turns a caption + emotion into a short children's story via Gemini.
// This is the one stage that never fails the run: any upstream problem is
// rendered as a user-visible placeholder that carries the cause.

use crate::agent::emotion::Emotion;
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

pub const PLACEHOLDER_PREFIX: &str = "Oops! There was an error generating the story:";

/// Result of story generation: either the story or a placeholder with its cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoryOutcome {
    Told { text: String },
    Placeholder { text: String, cause: String },
}

impl StoryOutcome {
    pub fn told(text: impl Into<String>) -> Self {
        StoryOutcome::Told { text: text.into() }
    }

    pub fn placeholder(cause: impl ToString) -> Self {
        let cause = cause.to_string();
        StoryOutcome::Placeholder {
            text: format!("{} {}", PLACEHOLDER_PREFIX, cause),
            cause,
        }
    }

    /// The text shown to the user (and narrated), whichever variant this is.
    pub fn text(&self) -> &str {
        match self {
            StoryOutcome::Told { text } | StoryOutcome::Placeholder { text, .. } => text,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, StoryOutcome::Placeholder { .. })
    }
}

#[async_trait]
pub trait Storyteller: Send + Sync {
    async fn tell(&self, caption: &str, emotion: Emotion) -> StoryOutcome;
}

pub fn story_prompt(caption: &str, emotion: Emotion) -> String {
    format!(
        "Write a short and magical story for a child based on this drawing caption: '{}' \
         and the emotion it conveys: '{}'.\nMake it imaginative, simple, and under 100 words.",
        caption, emotion
    )
}

/// Read `candidates[0].content.parts[0].text` from a generateContent reply.
pub fn extract_story(reply: &Value) -> Option<String> {
    reply["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
}

pub struct GeminiStoryteller {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl GeminiStoryteller {
    pub fn new(api_url: &str, model: &str, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn from_config(cfg: &CanvasConfig) -> Result<Self> {
        let key = cfg.gemini_api_key.clone().ok_or_else(|| {
            CanvasError::Config("GEMINI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(&cfg.gemini_api_url, &cfg.gemini_model, key))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        )
    }

    async fn request_story(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let reply: Value = resp.json().await?;
        extract_story(&reply).ok_or_else(|| {
            CanvasError::Provider("reply has no candidates[0].content.parts[0].text".to_string())
        })
    }
}

#[async_trait]
impl Storyteller for GeminiStoryteller {
    async fn tell(&self, caption: &str, emotion: Emotion) -> StoryOutcome {
        info!("[STORY] Writing a {} story about '{}'", emotion, caption);
        let prompt = story_prompt(caption, emotion);

        match self.request_story(&prompt).await {
            Ok(story) => {
                info!("[STORY] Received {} words", story.split_whitespace().count());
                StoryOutcome::told(story)
            }
            Err(e) => {
                // reqwest errors embed the URL, which carries the key
                let cause = match e {
                    CanvasError::Http(err) => err.without_url().to_string(),
                    other => other.to_string(),
                };
                warn!("[STORY] Generation failed, using placeholder: {}", cause);
                StoryOutcome::placeholder(cause)
            }
        }
    }
}
