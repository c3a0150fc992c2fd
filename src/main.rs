// SYNOID Canvas Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use synoid_canvas::agent::intake::save_upload;
use synoid_canvas::agent::pipeline::StoryPipeline;
use synoid_canvas::agent::voice::{filter_voice_models, TtsProvider, VoiceFilter, VoiceStudio};
use synoid_canvas::server::{self, AppState};
use synoid_canvas::CanvasConfig;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "synoid-canvas")]
#[command(about = "SYNOID Canvas: turn a drawing into a narrated story video", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one image
    Create {
        /// Drawing to narrate (jpg, jpeg or png)
        #[arg(short, long)]
        image: PathBuf,

        /// TTS provider: speechify or elevenlabs
        #[arg(short, long)]
        provider: Option<String>,

        /// Voice id for the selected provider
        #[arg(short, long)]
        voice: Option<String>,

        /// Narration language (Speechify only)
        #[arg(short, long)]
        language: Option<String>,

        /// TTS model (Speechify only)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List Speechify voice models
    Voices {
        #[arg(long)]
        gender: Option<String>,

        /// Exact locale, e.g. en-US
        #[arg(long)]
        locale: Option<String>,

        /// Required tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Start the HTTP API
    Serve {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("--- SYNOID CANVAS v{} ---", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = CanvasConfig::from_env();

    match cli.command {
        Commands::Create {
            image,
            provider,
            voice,
            language,
            model,
        } => {
            let pipeline = StoryPipeline::from_config(&config)?;
            let voice_settings = pipeline.voice_settings().with_overrides(
                provider.as_deref(),
                voice.as_deref(),
                language.as_deref(),
                model.as_deref(),
            )?;
            pipeline.preflight(&voice_settings)?;

            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Could not read {:?}", image))?;
            let file_name = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stored = save_upload(&config.output_dir, &file_name, &bytes).await?;

            let artifacts = pipeline.run_with_voice(&stored, &voice_settings).await?;

            println!("Caption:     {}", artifacts.caption);
            println!("Emotion:     {}", artifacts.emotion);
            println!("Story:\n{}\n", artifacts.story.text());
            println!("Audio:       {}", artifacts.audio_path.display());
            println!("Video:       {}", artifacts.video_path.display());
            println!("\n{}", artifacts.description);
        }

        Commands::Voices {
            gender,
            locale,
            tags,
        } => {
            let studio = VoiceStudio::from_config(&config);
            let voices = studio
                .list_voices(TtsProvider::Speechify.name(), None)
                .await?;
            let filter = VoiceFilter {
                gender,
                locale,
                tags,
            };
            for model in filter_voice_models(&voices, &filter) {
                println!("{}", model);
            }
        }

        Commands::Serve { port } => {
            let pipeline = StoryPipeline::from_config(&config)?;
            let state = Arc::new(AppState { pipeline });
            server::start_server(port, state).await?;
        }
    }

    Ok(())
}
