pub mod batch;
pub mod config;
mod orchestrator;
mod types;

pub use batch::{process_parallel, spawn_batch, BatchHandle};
pub use config::AnalysisConfig;
pub use orchestrator::{
    derive_metadata, resolve_frame_range, run_analysis, run_analysis_reported, AnalysisOutput,
};
pub use types::{BatchOutcome, NoOpReporter, PipelineStage, ProgressReporter};
