//! Session identifier utilities
//!
//! Session ids double as directory names in the artifact store, so parsing
//! is strict: only the canonical hyphenated UUID form is accepted.

use uuid::Uuid;

/// Generate a new random session id (UUIDv4)
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a session id from a path segment.
///
/// Returns `None` for anything that is not a hyphenated UUID, including
/// the simple, braced and URN forms `Uuid::parse_str` would otherwise accept.
pub fn parse(s: &str) -> Option<Uuid> {
    let id = Uuid::try_parse(s).ok()?;
    (id.hyphenated().to_string() == s.to_ascii_lowercase()).then_some(id)
}
