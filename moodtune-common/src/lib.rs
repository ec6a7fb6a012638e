//! # moodtune common library
//!
//! Shared code for the moodtune services:
//! - Error type shared by library crates
//! - Configuration loading (TOML file, environment, compiled defaults)
//! - Session identifier helpers

pub mod config;
pub mod error;
pub mod session_id;

pub use error::{Error, Result};
