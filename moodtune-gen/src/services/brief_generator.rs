//! Brief generator: mood → style description + lyrics via the chat model
//!
//! Never fails outward. Transport errors, non-success statuses and unusable
//! replies all degrade to fallback content (see [`ParseOutcome`]), so the
//! audio stage always receives a brief.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::upstream::{endpoint_url, BaseResp};
use crate::error::{GenerationError, GenerationResult};
use crate::models::{MusicBrief, ParseOutcome};

const CHAT_PATH: &str = "/v1/text/chatcompletion_v2";
const SERVICE: &str = "language model";

const SYSTEM_PROMPT: &str = "You are a professional music producer and songwriter. You know \
every musical style and you are skilled at turning feelings into music and lyrics.";

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// User instruction embedding the mood
pub fn build_user_prompt(mood: &str) -> String {
    format!(
        r#"The user's current mood is: {mood}

Write a complete music plan for this mood:

1. Music description (prompt):
   - Describe the musical style, the emotion and a fitting scene
   - Example: "pop, warm and cosy, for a sunny afternoon"
   - Be specific, emotionally rich and evocative
   - Length: 50-200 characters

2. Lyrics (lyrics):
   - A complete song structure
   - Must contain the section tags [Intro], [Verse], [Chorus], [Bridge], [Outro]
   - Every section should carry poetry and emotional depth
   - Separate lyric lines with line breaks
   - Length: 100-500 characters

Return strictly this JSON object:
{{
  "prompt": "style, emotion, scene",
  "lyrics": "[Intro]\nopening line\n\n[Verse]\nverse line 1\nverse line 2\n\n[Chorus]\nchorus line 1\nchorus line 2\n\n[Bridge]\nbridge line\n\n[Outro]\nclosing line"
}}

Notes:
- the prompt should capture the atmosphere and emotion of the music
- the lyrics must have the full song structure
- the lyrics should rhyme and have rhythm"#
    )
}

/// Chat-model client producing music briefs
#[derive(Debug, Clone)]
pub struct BriefGenerator {
    http_client: reqwest::Client,
    url: String,
    model: String,
    max_tokens: u32,
}

impl BriefGenerator {
    pub fn new(
        http_client: reqwest::Client,
        api_base: &str,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            http_client,
            url: endpoint_url(api_base, CHAT_PATH),
            model: model.into(),
            max_tokens,
        }
    }

    /// Turn a mood into a brief. Always returns usable content.
    pub async fn generate_brief(&self, mood: &str, credential: &str) -> MusicBrief {
        let outcome = match self.request_reply(mood, credential).await {
            Ok(reply) => ParseOutcome::from_reply(mood, &reply),
            Err(e) => ParseOutcome::Failed(e.to_string()),
        };

        match &outcome {
            ParseOutcome::Structured(_) => info!("Brief parsed from structured reply"),
            ParseOutcome::RawText(_) => {
                warn!("Language model reply was not JSON, using raw text as lyrics")
            }
            ParseOutcome::Failed(reason) => {
                warn!(error = %reason, "Language model call failed, using fallback brief")
            }
        }

        outcome.into_brief(mood)
    }

    /// Send the chat request and return the first reply's text.
    async fn request_reply(&self, mood: &str, credential: &str) -> GenerationResult<String> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", build_user_prompt(mood)),
            ],
        };

        debug!(model = %self.model, "Requesting music brief");

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

        let chat: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::MalformedResponse {
                    service: SERVICE,
                    message: e.to_string(),
                })?;

        if let Some(base) = chat.base_resp.as_ref().filter(|b| !b.is_success()) {
            return Err(GenerationError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message: format!("status_code {}: {}", base.status_code, base.status_msg),
            });
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse {
                service: SERVICE,
                message: "reply has no message content".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::brief::{fallback_lyrics, fallback_style};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOOD: &str = "happy and relaxed";

    fn generator(api_base: &str) -> BriefGenerator {
        let client = crate::services::upstream::build_http_client(Duration::from_secs(5)).unwrap();
        BriefGenerator::new(client, api_base, "MiniMax-Text-01", 4096)
    }

    fn chat_reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "base_resp": { "status_code": 0, "status_msg": "success" }
        }))
    }

    #[tokio::test]
    async fn test_fenced_reply_becomes_brief() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "MiniMax-Text-01", "max_tokens": 4096 })))
            .respond_with(chat_reply("```json\n{\"prompt\":\"P\",\"lyrics\":\"L\"}\n```"))
            .expect(1)
            .mount(&server)
            .await;

        let brief = generator(&server.uri()).generate_brief(MOOD, "test-key").await;

        assert_eq!(brief.style_description, "P");
        assert_eq!(brief.lyrics, "L");
    }

    #[tokio::test]
    async fn test_plain_text_reply_is_truncated() {
        let server = MockServer::start().await;
        let text = "a gentle song about the sea ".repeat(20);
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(chat_reply(&text))
            .mount(&server)
            .await;

        let brief = generator(&server.uri()).generate_brief(MOOD, "test-key").await;

        assert!(brief.style_description.contains(MOOD));
        assert_eq!(brief.lyrics, text.chars().take(200).collect::<String>());
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let brief = generator(&server.uri()).generate_brief(MOOD, "test-key").await;

        assert_eq!(brief.style_description, fallback_style(MOOD));
        assert_eq!(brief.lyrics, fallback_lyrics(MOOD));
    }

    #[tokio::test]
    async fn test_service_status_code_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [],
                "base_resp": { "status_code": 1004, "status_msg": "authentication failed" }
            })))
            .mount(&server)
            .await;

        let brief = generator(&server.uri()).generate_brief(MOOD, "bad-key").await;

        assert_eq!(brief.lyrics, fallback_lyrics(MOOD));
    }

    #[tokio::test]
    async fn test_non_json_body_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let brief = generator(&server.uri()).generate_brief(MOOD, "test-key").await;

        assert!(!brief.style_description.is_empty());
        assert!(!brief.lyrics.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        // Port 9 (discard) is not listening on test hosts
        let brief = generator("http://127.0.0.1:9").generate_brief(MOOD, "test-key").await;

        assert_eq!(brief.style_description, fallback_style(MOOD));
        assert_eq!(brief.lyrics, fallback_lyrics(MOOD));
    }

    #[test]
    fn test_user_prompt_embeds_mood_and_sections() {
        let prompt = build_user_prompt("rainy sunday");
        assert!(prompt.contains("rainy sunday"));
        for section in ["[Intro]", "[Verse]", "[Chorus]", "[Bridge]", "[Outro]"] {
            assert!(prompt.contains(section));
        }
        assert!(prompt.contains("\"prompt\""));
        assert!(prompt.contains("\"lyrics\""));
    }
}
