//! Data models for the generation pipeline

pub mod brief;
pub mod locator;

pub use brief::{MusicBrief, ParseOutcome};
pub use locator::Locator;
