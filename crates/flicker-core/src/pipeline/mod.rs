pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{
    analyze_repository, run_batch, run_batch_reported, staging_dir, write_reports,
};
pub use types::{PipelineStage, ProgressReporter, RunOutput};
