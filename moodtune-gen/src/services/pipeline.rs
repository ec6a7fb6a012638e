//! Pipeline orchestrator: brief generation followed by audio generation
//!
//! The two stages run strictly in sequence since the audio request is built
//! from the brief. This is the single place where stage errors are turned into
//! the caller-facing [`PipelineError`].

use moodtune_common::config::UpstreamConfig;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use super::artifact_store::ArtifactStore;
use super::audio_generator::AudioGenerator;
use super::brief_generator::BriefGenerator;
use super::upstream::build_http_client;
use crate::error::{GenerationResult, PipelineError};
use crate::models::{Locator, MusicBrief};

/// Brief plus the locator of the stored track
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub brief: MusicBrief,
    pub locator: Locator,
}

pub struct Pipeline {
    briefs: BriefGenerator,
    audio: AudioGenerator,
}

impl Pipeline {
    pub fn new(briefs: BriefGenerator, audio: AudioGenerator) -> Self {
        Self { briefs, audio }
    }

    /// Build both generators over one shared HTTP client
    pub fn from_config(upstream: &UpstreamConfig, store: ArtifactStore) -> GenerationResult<Self> {
        let http_client = build_http_client(Duration::from_secs(upstream.timeout_secs))?;

        let briefs = BriefGenerator::new(
            http_client.clone(),
            &upstream.api_base,
            upstream.chat_model.clone(),
            upstream.max_tokens,
        );
        let audio = AudioGenerator::new(
            http_client,
            &upstream.api_base,
            upstream.music_model.clone(),
            store,
        );

        Ok(Self::new(briefs, audio))
    }

    /// Run mood → brief → stored track.
    ///
    /// Input is validated before any upstream call. No partial result is
    /// returned when the audio stage fails.
    pub async fn run(&self, mood: &str, credential: &str) -> Result<PipelineOutput, PipelineError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Please provide a valid API key".to_string(),
            ));
        }

        let mood = mood.trim();
        if mood.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Please describe your mood".to_string(),
            ));
        }

        let brief = self.briefs.generate_brief(mood, credential).await;
        info!(
            style = %brief.style_description,
            lyrics_chars = brief.lyrics.chars().count(),
            "Brief ready, generating audio"
        );

        let locator = self
            .audio
            .generate_audio(&brief.style_description, &brief.lyrics, credential)
            .await
            .map_err(|e| {
                warn!(error = %e, "Audio generation failed");
                PipelineError::from(e)
            })?;

        Ok(PipelineOutput { brief, locator })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pipeline(api_base: &str, store: ArtifactStore) -> Pipeline {
        let upstream = UpstreamConfig {
            api_base: api_base.to_string(),
            timeout_secs: 5,
            ..Default::default()
        };
        Pipeline::from_config(&upstream, store).unwrap()
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_upstream_call() {
        let temp = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let pipeline = pipeline(&server.uri(), ArtifactStore::new(temp.path()));

        for (mood, credential) in [
            ("", "valid-credential"),
            ("   ", "valid-credential"),
            ("calm", ""),
            ("calm", " \t"),
        ] {
            let result = pipeline.run(mood, credential).await;
            assert!(
                matches!(result, Err(PipelineError::InvalidInput(_))),
                "Expected InvalidInput for ({:?}, {:?})",
                mood,
                credential
            );
        }
    }

    #[tokio::test]
    async fn test_brief_flows_into_audio_request() {
        let temp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(temp.path());
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/text/chatcompletion_v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "{\"prompt\":\"dream pop\",\"lyrics\":\"[Intro]\\nhi\"}" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/music_generation"))
            .and(wiremock::matchers::body_partial_json(json!({
                "prompt": "dream pop",
                "lyrics": "[Intro]\nhi"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "audio": "00ff" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let track = pipeline(&server.uri(), store.clone())
            .run("  dreamy  ", "valid-credential")
            .await
            .unwrap();

        assert_eq!(track.brief.style_description, "dream pop");
        assert_eq!(track.brief.lyrics, "[Intro]\nhi");
        let stored =
            std::fs::read(store.session_dir(track.locator.session_id).join(&track.locator.filename))
                .unwrap();
        assert_eq!(stored, vec![0x00, 0xff]);
    }

    #[tokio::test]
    async fn test_audio_failure_becomes_generation_failed() {
        let temp = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/text/chatcompletion_v2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/music_generation"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let result = pipeline(&server.uri(), ArtifactStore::new(temp.path()))
            .run("calm", "valid-credential")
            .await;

        match result {
            Err(PipelineError::GenerationFailed(msg)) => {
                assert!(msg.contains("502"));
                assert!(msg.contains("bad gateway"));
            }
            other => panic!("Expected GenerationFailed, got {:?}", other),
        }
    }
}
