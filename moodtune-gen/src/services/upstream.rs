//! Shared plumbing for the MiniMax-compatible upstream services

use serde::Deserialize;
use std::time::Duration;

use crate::error::{GenerationError, GenerationResult};

pub const USER_AGENT: &str = concat!("moodtune/", env!("CARGO_PKG_VERSION"));

/// Status block MiniMax attaches to every response, including HTTP 200 ones
#[derive(Debug, Clone, Deserialize)]
pub struct BaseResp {
    #[serde(default)]
    pub status_code: i64,
    #[serde(default)]
    pub status_msg: String,
}

impl BaseResp {
    pub fn is_success(&self) -> bool {
        self.status_code == 0
    }
}

/// Build the HTTP client shared by both upstream services
pub fn build_http_client(timeout: Duration) -> GenerationResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| GenerationError::Network {
            service: "http client",
            message: e.to_string(),
        })
}

/// Join the API base and an endpoint path
pub fn endpoint_url(api_base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
