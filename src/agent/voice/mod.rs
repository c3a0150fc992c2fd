// SYNOID Voice Studio
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod catalogue;
pub mod elevenlabs;
pub mod speechify;
pub mod tts;

pub use catalogue::{filter_voice_models, Voice, VoiceFilter, VoiceLanguage, VoiceModel};
pub use elevenlabs::ElevenLabsBackend;
pub use speechify::SpeechifyBackend;
pub use tts::{Credentials, SpeechBackend, SpeechRequest, TtsProvider, VoiceStudio};
