//! Generation pipeline services
//!
//! Leaf-first: artifact store → brief / audio generators → pipeline.

pub mod artifact_store;
pub mod audio_generator;
pub mod brief_generator;
pub mod pipeline;
pub mod upstream;

pub use artifact_store::{ArtifactStore, ResolvedArtifact};
pub use audio_generator::AudioGenerator;
pub use brief_generator::BriefGenerator;
pub use pipeline::{Pipeline, PipelineOutput};
