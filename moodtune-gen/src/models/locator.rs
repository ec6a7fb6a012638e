//! Track locator: the (session, filename) pair returned after generation

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Identifies one stored track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    pub session_id: Uuid,
    pub filename: String,
}

impl Locator {
    pub fn new(session_id: Uuid, filename: impl Into<String>) -> Self {
        Self {
            session_id,
            filename: filename.into(),
        }
    }

    /// Download URL path served by the fetch route
    pub fn url_path(&self) -> String {
        format!("/download/{}/{}", self.session_id, self.filename)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session_id, self.filename)
    }
}
