// Data-quality pipeline: validation, reliability flagging, enrichment, and projection

pub mod orchestrator;
pub mod processing;

pub use orchestrator::{Pipeline, PipelineOutput};
