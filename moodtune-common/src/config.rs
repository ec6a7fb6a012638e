//! Configuration loading and sessions folder resolution
//!
//! Bootstrap configuration comes from an optional TOML file. Individual
//! values may be overridden by command-line arguments and environment
//! variables; the binary decides precedence per field using the helpers here.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default MiniMax-compatible API base
pub const DEFAULT_API_BASE: &str = "https://api.minimaxi.com";

/// Default folder holding generated sessions (relative to the working directory)
pub const DEFAULT_SESSIONS_DIR: &str = "temp_sessions";

/// Default listen address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 5111;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional. A missing file yields `TomlConfig::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Listen address
    #[serde(default)]
    pub host: Option<String>,

    /// Listen port
    #[serde(default)]
    pub port: Option<u16>,

    /// Root folder for generated session directories
    #[serde(default)]
    pub sessions_dir: Option<PathBuf>,

    /// Age after which session directories are deleted.
    ///
    /// Absent means sessions are never pruned by the service.
    #[serde(default)]
    pub session_ttl_secs: Option<u64>,

    /// Upstream service settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream (language model + music generation) settings
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Scheme and host of the API, without trailing path
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Chat completion model
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Music generation model
    #[serde(default = "default_music_model")]
    pub music_model: String,

    /// Token limit for the chat completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request timeout in seconds. Music generation routinely takes minutes.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            chat_model: default_chat_model(),
            music_model: default_music_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_chat_model() -> String {
    "MiniMax-Text-01".to_string()
}

fn default_music_model() -> String {
    "music-2.0".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform config file location: `<config_dir>/moodtune/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodtune").join("config.toml"))
}

/// Load TOML configuration.
///
/// A missing file is not an error: a warning is logged and defaults are
/// returned. A file that exists but cannot be read or parsed is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Sessions folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (`temp_sessions`)
pub fn resolve_sessions_dir(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.sessions_dir {
        return path.clone();
    }

    PathBuf::from(DEFAULT_SESSIONS_DIR)
}
