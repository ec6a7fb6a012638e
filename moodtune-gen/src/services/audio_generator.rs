//! Audio generator: brief → stored MP3 via the music generation service
//!
//! Unlike the brief stage there is no safe fallback for "no audio", so every
//! failure propagates. Nothing is written to the artifact store unless the
//! payload decoded successfully.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::artifact_store::ArtifactStore;
use super::upstream::{endpoint_url, BaseResp};
use crate::error::{GenerationError, GenerationResult};
use crate::models::Locator;

const MUSIC_PATH: &str = "/v1/music_generation";
const SERVICE: &str = "music generation";

/// Encoding parameters sent with every request
#[derive(Debug, Clone, Serialize)]
pub struct AudioSetting {
    pub sample_rate: u32,
    pub bitrate: u32,
    pub format: String,
}

impl Default for AudioSetting {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            bitrate: 256000,
            format: "mp3".to_string(),
        }
    }
}

/// Music generation request body
#[derive(Debug, Serialize)]
pub struct MusicRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub lyrics: &'a str,
    pub audio_setting: &'a AudioSetting,
}

#[derive(Debug, Deserialize)]
struct MusicResponse {
    #[serde(default)]
    data: Option<MusicData>,
    #[serde(default)]
    base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
struct MusicData {
    #[serde(default)]
    audio: Option<String>,
}

/// Music-service client that persists results into an [`ArtifactStore`]
#[derive(Debug, Clone)]
pub struct AudioGenerator {
    http_client: reqwest::Client,
    url: String,
    model: String,
    audio_setting: AudioSetting,
    store: ArtifactStore,
}

impl AudioGenerator {
    pub fn new(
        http_client: reqwest::Client,
        api_base: &str,
        model: impl Into<String>,
        store: ArtifactStore,
    ) -> Self {
        Self {
            http_client,
            url: endpoint_url(api_base, MUSIC_PATH),
            model: model.into(),
            audio_setting: AudioSetting::default(),
            store,
        }
    }

    /// Generate, decode and store a track. Returns its locator.
    pub async fn generate_audio(
        &self,
        style_description: &str,
        lyrics: &str,
        credential: &str,
    ) -> GenerationResult<Locator> {
        let audio_bytes = self
            .request_audio(style_description, lyrics, credential)
            .await?;

        let session_id = self.store.create_session().await?;
        let filename = format!(
            "music_{}.{}",
            chrono::Utc::now().timestamp(),
            self.audio_setting.format
        );
        let locator = self.store.write(session_id, &filename, &audio_bytes).await?;

        info!(
            session_id = %locator.session_id,
            filename = %locator.filename,
            bytes = audio_bytes.len(),
            "Track generated"
        );

        Ok(locator)
    }

    /// Call the service and return the decoded audio payload.
    async fn request_audio(
        &self,
        style_description: &str,
        lyrics: &str,
        credential: &str,
    ) -> GenerationResult<Vec<u8>> {
        let request = MusicRequest {
            model: &self.model,
            prompt: style_description,
            lyrics,
            audio_setting: &self.audio_setting,
        };

        debug!(model = %self.model, "Requesting music generation");

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Network {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: MusicResponse = response.json().await.map_err(|e| malformed(e.to_string()))?;

        if let Some(base) = body.base_resp.as_ref().filter(|b| !b.is_success()) {
            return Err(GenerationError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message: format!("status_code {}: {}", base.status_code, base.status_msg),
            });
        }

        let audio_hex = body
            .data
            .and_then(|data| data.audio)
            .filter(|audio| !audio.trim().is_empty())
            .ok_or_else(|| malformed("missing data.audio field".to_string()))?;

        hex::decode(audio_hex.trim()).map_err(|e| malformed(format!("invalid hex audio: {}", e)))
    }
}

fn malformed(message: String) -> GenerationError {
    GenerationError::MalformedResponse {
        service: SERVICE,
        message,
    }
}
