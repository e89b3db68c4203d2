use crate::record::ResultRecord;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    SamplingBrightness,
    ProcessingFrames,
    Reducing,
    Fitting,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SamplingBrightness => write!(f, "Sampling brightness"),
            Self::ProcessingFrames => write!(f, "Processing frames"),
            Self::Reducing => write!(f, "Reducing"),
            Self::Fitting => write!(f, "Fitting"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// Work items completed so far in the current stage.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every update.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Result of processing a frame range.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    /// Records in frame order.
    pub records: Vec<ResultRecord>,
    /// Frames skipped because reading or segmenting them failed.
    pub skipped: Vec<usize>,
    /// The batch stopped early on request.
    pub cancelled: bool,
}
