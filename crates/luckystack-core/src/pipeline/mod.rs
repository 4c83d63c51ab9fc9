pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{process_video, run_pipeline};
pub use types::{
    NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter, VideoReport, VideoResult,
};
