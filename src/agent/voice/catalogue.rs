// SYNOID Voice Catalogue
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceLanguage {
    pub locale: String,
    #[serde(default)]
    pub preview_audio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceModel {
    pub name: String,
    #[serde(default)]
    pub languages: Vec<VoiceLanguage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub models: Vec<VoiceModel>,
}

/// Optional predicates, all of which must hold for a voice to match.
#[derive(Debug, Clone, Default)]
pub struct VoiceFilter {
    pub gender: Option<String>,
    pub locale: Option<String>,
    pub tags: Vec<String>,
}

impl VoiceFilter {
    pub fn matches(&self, voice: &Voice) -> bool {
        if let Some(gender) = self.gender.as_deref().filter(|g| !g.is_empty()) {
            if !voice.gender.eq_ignore_ascii_case(gender) {
                return false;
            }
        }

        if let Some(locale) = self.locale.as_deref().filter(|l| !l.is_empty()) {
            let spoken = voice
                .models
                .iter()
                .any(|m| m.languages.iter().any(|lang| lang.locale == locale));
            if !spoken {
                return false;
            }
        }

        self.tags.iter().all(|tag| voice.tags.contains(tag))
    }
}

/// Model names of every matching voice, in catalogue order.
pub fn filter_voice_models(voices: &[Voice], filter: &VoiceFilter) -> Vec<String> {
    voices
        .iter()
        .filter(|v| filter.matches(v))
        .flat_map(|v| v.models.iter().map(|m| m.name.clone()))
        .collect()
}
