// Shared test doubles for the pipeline integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use synoid_canvas::agent::caption::Captioner;
use synoid_canvas::agent::compositor::FrameCompositor;
use synoid_canvas::agent::emotion::Emotion;
use synoid_canvas::agent::muxer::VideoMuxer;
use synoid_canvas::agent::palette::{ColorSampler, Rgb};
use synoid_canvas::agent::pipeline::StoryPipeline;
use synoid_canvas::agent::story::{StoryOutcome, Storyteller};
use synoid_canvas::agent::voice::{
    Credentials, SpeechBackend, SpeechRequest, TtsProvider, VoiceStudio,
};
use synoid_canvas::{CanvasError, Result};

pub struct FixedCaption(pub &'static str);

#[async_trait]
impl Captioner for FixedCaption {
    async fn caption(&self, _image_path: &Path) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Caption double that counts how often the vision model was asked.
pub struct CountingCaption {
    pub calls: AtomicUsize,
}

impl CountingCaption {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Captioner for CountingCaption {
    async fn caption(&self, _image_path: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("a smiling dog".to_string())
    }
}

pub struct FailingCaption;

#[async_trait]
impl Captioner for FailingCaption {
    async fn caption(&self, _image_path: &Path) -> Result<String> {
        Err(CanvasError::Provider("vision model is offline".to_string()))
    }
}

pub struct FixedColor(pub Rgb);

impl ColorSampler for FixedColor {
    fn dominant_color(&self, _image_path: &Path) -> Result<Rgb> {
        Ok(self.0)
    }
}

pub struct TemplateStory;

#[async_trait]
impl Storyteller for TemplateStory {
    async fn tell(&self, caption: &str, emotion: Emotion) -> StoryOutcome {
        StoryOutcome::told(format!(
            "Once there was {} feeling {}.\nThe end.",
            caption, emotion
        ))
    }
}

pub struct BrokenStory;

#[async_trait]
impl Storyteller for BrokenStory {
    async fn tell(&self, _caption: &str, _emotion: Emotion) -> StoryOutcome {
        StoryOutcome::placeholder("HTTP status server error (503 Service Unavailable)")
    }
}

/// Speech double that records what it was asked to say.
pub struct RecordingSpeech {
    pub provider: TtsProvider,
    pub calls: AtomicUsize,
    pub last_text: std::sync::Mutex<Option<String>>,
}

impl RecordingSpeech {
    pub fn new(provider: TtsProvider) -> Arc<Self> {
        Arc::new(Self {
            provider,
            calls: AtomicUsize::new(0),
            last_text: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechBackend for RecordingSpeech {
    fn provider(&self) -> TtsProvider {
        self.provider
    }

    async fn render(&self, request: &SpeechRequest, _api_key: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(request.text.clone());
        Ok(b"ID3 fake mp3".to_vec())
    }
}

/// Muxer double: copies the frame to the output path.
pub struct CopyMuxer {
    pub calls: AtomicUsize,
}

impl CopyMuxer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl VideoMuxer for CopyMuxer {
    async fn mux(&self, frame: &Path, audio: &Path, output: &Path) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(audio.exists(), "audio must exist before muxing");
        tokio::fs::copy(frame, output).await?;
        Ok(output.to_path_buf())
    }
}

pub struct Doubles {
    pub speechify: Arc<RecordingSpeech>,
    pub elevenlabs: Arc<RecordingSpeech>,
    pub muxer: Arc<CopyMuxer>,
}

pub fn studio(doubles: &Doubles) -> VoiceStudio {
    VoiceStudio::new(
        doubles.speechify.clone(),
        doubles.elevenlabs.clone(),
        Credentials {
            speechify: Some("test-speechify-key".to_string()),
            elevenlabs: Some("test-elevenlabs-key".to_string()),
        },
    )
}

pub fn doubles() -> Doubles {
    Doubles {
        speechify: RecordingSpeech::new(TtsProvider::Speechify),
        elevenlabs: RecordingSpeech::new(TtsProvider::ElevenLabs),
        muxer: CopyMuxer::new(),
    }
}

/// Pipeline with every external call stubbed, writing under `output_dir`.
pub fn stub_pipeline(
    output_dir: &Path,
    captioner: Arc<dyn Captioner>,
    storyteller: Arc<dyn Storyteller>,
    doubles: &Doubles,
) -> StoryPipeline {
    StoryPipeline::new(
        captioner,
        Arc::new(FixedColor([210, 50, 40])),
        storyteller,
        studio(doubles),
        doubles.muxer.clone(),
    )
    .compositor(FrameCompositor {
        font_candidates: Vec::new(),
        font_size: 36.0,
    })
    .output_dir(output_dir)
}

/// Entries under `<output_dir>/runs`, zero if the directory was never made.
pub fn run_dirs(output_dir: &Path) -> usize {
    std::fs::read_dir(output_dir.join("runs"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([210, 50, 40]));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn write_png(path: &Path) {
    std::fs::write(path, png_bytes(96, 64)).unwrap();
}
