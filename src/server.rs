// SYNOID Canvas Web Server
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::agent::intake::save_upload;
use crate::agent::media_tools::ffmpeg_available;
use crate::agent::pipeline::{PipelineArtifacts, StoryPipeline, OUTPUTS_ROUTE};
use crate::error::CanvasError;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub struct AppState {
    pub pipeline: StoryPipeline,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub ffmpeg: bool,
}

/// JSON `{ "error": ... }` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<CanvasError> for ApiError {
    fn from(err: CanvasError) -> Self {
        if err.is_config() || matches!(err.root(), CanvasError::InvalidUpload(_)) {
            return Self::bad_request(err.to_string());
        }

        let message = match &err {
            CanvasError::Stage { .. } => err.to_string(),
            other => format!("Something went wrong: {}", other),
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(format!("Invalid upload: {}", err.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn create_router(state: SharedState) -> Router {
    let outputs = ServeDir::new(state.pipeline.output_path());

    Router::new()
        .route("/api/health", get(health))
        .route("/api/stories", post(create_story))
        .nest_service(OUTPUTS_ROUTE, outputs)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, state: SharedState) -> std::io::Result<()> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let display_addr = if addr.ip().is_unspecified() {
        format!("127.0.0.1:{}", port)
    } else {
        addr.to_string()
    };
    info!("[SERVER] 🚀 SYNOID Canvas running on http://{}", display_addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        ffmpeg: ffmpeg_available().await,
    })
}

#[derive(Default)]
struct StoryForm {
    image: Option<(String, Vec<u8>)>,
    provider: Option<String>,
    voice: Option<String>,
    language: Option<String>,
    model: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<StoryForm, ApiError> {
    let mut form = StoryForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.image = Some((file_name, bytes.to_vec()));
            }
            "provider" => form.provider = Some(field.text().await?),
            "voice" => form.voice = Some(field.text().await?),
            "language" => form.language = Some(field.text().await?),
            "model" => form.model = Some(field.text().await?),
            other => warn!("[SERVER] Ignoring unexpected form field '{}'", other),
        }
    }

    Ok(form)
}

async fn create_story(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<PipelineArtifacts>, ApiError> {
    let form = read_form(multipart).await?;
    let (file_name, bytes) = form
        .image
        .ok_or_else(|| ApiError::bad_request("Invalid upload: missing 'image' field"))?;

    let pipeline = &state.pipeline;
    let voice = pipeline.voice_settings().with_overrides(
        form.provider.as_deref(),
        form.voice.as_deref(),
        form.language.as_deref(),
        form.model.as_deref(),
    )?;
    pipeline.preflight(&voice)?;

    let image_path = save_upload(pipeline.output_path(), &file_name, &bytes).await?;

    info!("[SERVER] New story request for {:?}", image_path);
    match pipeline.run_with_voice(&image_path, &voice).await {
        Ok(artifacts) => Ok(Json(artifacts)),
        Err(e) => {
            error!("[SERVER] {}", e);
            Err(e.into())
        }
    }
}
