use std::path::PathBuf;

use crate::analysis::BatchSummary;

/// Batch processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Connecting,
    Enumerating,
    Analyzing,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::Enumerating => write!(f, "Listing datasets"),
            Self::Analyzing => write!(f, "Analyzing datasets"),
            Self::Writing => write!(f, "Writing reports"),
        }
    }
}

/// Everything a finished run produced.
#[derive(Clone, Debug)]
pub struct RunOutput {
    pub batch: BatchSummary,
    pub files: Vec<PathBuf>,
}

/// Thread-safe progress reporting for batch runs.
///
/// Implementors can use this to drive progress bars or logging.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items
    /// in this stage (e.g. dataset count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_batch` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
