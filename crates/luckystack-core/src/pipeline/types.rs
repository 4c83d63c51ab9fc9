use std::path::PathBuf;

use crate::error::LuckyError;
use crate::frame::{CoaddedImage, Frame};

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    Coadding,
    Sharpening,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extracting => write!(f, "Extracting frames"),
            Self::Coadding => write!(f, "Coadding"),
            Self::Sharpening => write!(f, "Sharpening"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Images produced for one video.
#[derive(Clone, Debug)]
pub struct VideoResult {
    pub coadded: CoaddedImage,
    pub sharpened: Frame,
}

/// Result of processing one video.
#[derive(Clone, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum PipelineOutput {
    Image(VideoResult),
    /// The video held no valid frames.
    NoImage,
}

impl PipelineOutput {
    pub fn image(&self) -> Option<&VideoResult> {
        match self {
            Self::Image(result) => Some(result),
            Self::NoImage => None,
        }
    }
}

/// Outcome of one video within a multi-video run.
#[derive(Debug)]
pub struct VideoReport {
    pub video: PathBuf,
    pub outcome: std::result::Result<PipelineOutput, LuckyError>,
    /// Files written for this video.
    pub written: Vec<PathBuf>,
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations. Within one
/// stage `advance` receives a non-decreasing count of completed items.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage, if known. For extraction it is the
    /// container's estimate and may be exceeded or never reached.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` work items within the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Progress reporter that discards every update.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
