//! POST /generate: mood → brief → stored track

use axum::{extract::State, routing::post, Form, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiResult, AppState};

/// Form fields posted by the web page
///
/// Missing fields default to empty so they are reported as invalid input
/// rather than rejected by the extractor.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub api_key: String,
}

/// POST /generate response
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub status: String,
    pub message: String,
    /// Download path of the track
    pub file_url: String,
    pub session_id: Uuid,
    pub filename: String,
    /// Style description sent to the music service
    pub prompt: String,
    pub lyrics: String,
}

/// POST /generate
///
/// Blocks until both upstream calls complete.
pub async fn generate(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> ApiResult<Json<GenerateResponse>> {
    let track = state.pipeline.run(&form.mood, &form.api_key).await?;

    tracing::info!(
        session_id = %track.locator.session_id,
        filename = %track.locator.filename,
        "Generation request completed"
    );

    Ok(Json(GenerateResponse {
        status: "success".to_string(),
        message: "Music generated".to_string(),
        file_url: track.locator.url_path(),
        session_id: track.locator.session_id,
        filename: track.locator.filename,
        prompt: track.brief.style_description,
        lyrics: track.brief.lyrics,
    }))
}

/// Build generation routes
pub fn generate_routes() -> Router<AppState> {
    Router::new().route("/generate", post(generate))
}
