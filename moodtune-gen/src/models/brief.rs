//! Music brief and language-model reply normalization
//!
//! The language model is asked for a JSON object but does not always comply.
//! A reply is classified into a [`ParseOutcome`] and then normalized into a
//! [`MusicBrief`] without any network access, so every tier of the fallback
//! chain is testable on its own.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Style used when a structured reply has no usable `prompt`
pub const GENERIC_STYLE: &str = "emotional, melodic pop music";

/// Number of characters of an unstructured reply kept as lyrics
pub const RAW_TEXT_LYRICS_CHARS: usize = 200;

/// Style description + lyrics pair handed to the music service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicBrief {
    pub style_description: String,
    pub lyrics: String,
}

/// Classification of a language-model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Reply held a JSON object; missing keys already replaced by fallbacks
    Structured(MusicBrief),
    /// Reply was not JSON; carries the full reply text
    RawText(String),
    /// No reply text was obtained
    Failed(String),
}

impl ParseOutcome {
    /// Classify a reply text for the given mood.
    pub fn from_reply(mood: &str, reply: &str) -> Self {
        let candidate = extract_json_candidate(reply);

        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => {
                let field = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .filter(|s| !s.trim().is_empty())
                        .map(str::to_string)
                };

                ParseOutcome::Structured(MusicBrief {
                    style_description: field("prompt").unwrap_or_else(|| GENERIC_STYLE.to_string()),
                    lyrics: field("lyrics").unwrap_or_else(|| fallback_lyrics(mood)),
                })
            }
            _ => ParseOutcome::RawText(reply.to_string()),
        }
    }

    /// Map any outcome to a usable brief.
    ///
    /// Both fields of the result are non-empty whenever `mood` is non-empty.
    pub fn into_brief(self, mood: &str) -> MusicBrief {
        match self {
            ParseOutcome::Structured(brief) => brief,
            ParseOutcome::RawText(text) if !text.trim().is_empty() => MusicBrief {
                style_description: fallback_style(mood),
                lyrics: text.chars().take(RAW_TEXT_LYRICS_CHARS).collect(),
            },
            ParseOutcome::RawText(_) | ParseOutcome::Failed(_) => MusicBrief {
                style_description: fallback_style(mood),
                lyrics: fallback_lyrics(mood),
            },
        }
    }
}

/// Style description used whenever the reply could not be parsed
pub fn fallback_style(mood: &str) -> String {
    format!("emotional music expressing {}", mood)
}

/// Three-line lyric used when no usable lyric came back
pub fn fallback_lyrics(mood: &str) -> String {
    format!(
        "The feeling of this moment\n{}\nLet the music keep you company",
        mood
    )
}

/// Pull the JSON candidate out of a reply.
///
/// A ```` ```json ```` fence wins over a bare ```` ``` ```` fence. The text up
/// to the next fence (or the end of the reply when unterminated) is taken.
/// Replies without any fence are returned unchanged.
pub fn extract_json_candidate(reply: &str) -> &str {
    if let Some((_, rest)) = reply.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }

    match reply.split("```").nth(1) {
        Some(inner) => strip_fence_tag(inner.trim()),
        None => reply,
    }
}

// Drops a language tag such as "JSON" left on the opening fence line.
fn strip_fence_tag(inner: &str) -> &str {
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) => {
            body.trim()
        }
        _ => inner,
    }
}
