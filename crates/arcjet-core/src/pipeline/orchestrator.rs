use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ArcjetError, Result};
use crate::fit::{fit_series, FitReport};
use crate::io::{FrameSource, VideoMetadata};
use crate::processor::{infer_flow, FrameProcessor};
use crate::reduce::{reduce, TimeSeries};
use crate::segment::PixelClassifier;
use crate::toi::{brightness_signal, time_of_interest, SequenceClassifier, TimeOfInterest, ToiConfig};

use super::batch::process_parallel;
use super::config::AnalysisConfig;
use super::types::{BatchOutcome, NoOpReporter, PipelineStage, ProgressReporter};

/// Everything one analysis run produces.
#[derive(Clone, Debug)]
pub struct AnalysisOutput {
    /// Frames that were processed.
    pub frames: Range<usize>,
    /// Detected time of interest, when the range was not configured.
    pub toi: Option<TimeOfInterest>,
    pub outcome: BatchOutcome,
    pub series: TimeSeries,
    pub fits: FitReport,
}

/// Configured range, else the detected time of interest, else every frame.
pub fn resolve_frame_range(
    config: &AnalysisConfig,
    source: &dyn FrameSource,
    sequence: &dyn SequenceClassifier,
    reporter: &dyn ProgressReporter,
) -> Result<(Range<usize>, Option<TimeOfInterest>)> {
    let total = source.frame_count();
    if total == 0 {
        return Err(ArcjetError::EmptySequence);
    }
    if let Some((first, last)) = config.frames {
        if last >= total {
            return Err(ArcjetError::FrameIndexOutOfRange { index: last, total });
        }
        return Ok((first..last + 1, None));
    }

    let brightness = brightness_signal(
        source,
        config.toi.stride,
        config.processor.crop.as_ref(),
        reporter,
    )?;
    match time_of_interest(&brightness, total, &config.toi, sequence)? {
        Some(toi) => Ok((toi.first..toi.last + 1, Some(toi))),
        None => Ok((0..total, None)),
    }
}

/// Measure `source` for its metadata sidecar.
///
/// Flow direction is inferred from the middle of the time of interest. Without
/// one it stays unset and the frame processor infers it from the first frame
/// it segments; pre-test frames are too dark to tell.
pub fn derive_metadata(
    source: &dyn FrameSource,
    config: &ToiConfig,
    sequence: &dyn SequenceClassifier,
    reporter: &dyn ProgressReporter,
) -> Result<VideoMetadata> {
    let info = source.info()?;
    let brightness = brightness_signal(source, config.stride, None, reporter)?;
    let toi = time_of_interest(&brightness, info.total_frames, config, sequence)?;

    let flow = match &toi {
        Some(toi) => {
            let middle = toi.first + (toi.last - toi.first) / 2;
            let flow = infer_flow(&source.read_frame(middle)?.to_gray());
            debug!(frame = middle, %flow, "Inferred flow direction");
            Some(flow)
        }
        None => None,
    };

    Ok(VideoMetadata {
        width: info.width,
        height: info.height,
        channels: info.channels,
        frame_count: info.total_frames,
        first_good_frame: toi.as_ref().map(|t| t.first),
        last_good_frame: toi.as_ref().map(|t| t.last),
        flow,
        crop: None,
        brightness,
        brightness_stride: config.stride.max(1),
    })
}

/// Run frame processing, reduction and fitting with a progress reporter.
///
/// The physical diameter is checked before any frame is touched.
pub fn run_analysis_reported(
    config: &AnalysisConfig,
    source: &dyn FrameSource,
    classifier: Option<Arc<dyn PixelClassifier>>,
    sequence: &dyn SequenceClassifier,
    reporter: &dyn ProgressReporter,
) -> Result<AnalysisOutput> {
    config.validate()?;
    if config.reduction.diameter.is_none() {
        return Err(ArcjetError::MissingDiameter);
    }

    let mut processor = FrameProcessor::new(config.processor.clone(), classifier)?;
    let (frames, toi) = resolve_frame_range(config, source, sequence, reporter)?;
    info!(
        first = frames.start,
        last = frames.end.saturating_sub(1),
        strategy = processor.segmenter_name(),
        "Processing frames"
    );

    let outcome = process_parallel(source, &mut processor, frames.clone(), reporter)?;

    reporter.begin_stage(PipelineStage::Reducing, None);
    let mut reduction = config.reduction.clone();
    if reduction.flow.is_none() {
        reduction.flow = processor.flow();
    }
    let series = reduce(&outcome.records, &reduction)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Fitting, None);
    let fits = fit_series(&series, &config.fit);
    reporter.finish_stage();

    Ok(AnalysisOutput {
        frames,
        toi,
        outcome,
        series,
        fits,
    })
}

/// Run the full analysis without progress reporting.
pub fn run_analysis(
    config: &AnalysisConfig,
    source: &dyn FrameSource,
    classifier: Option<Arc<dyn PixelClassifier>>,
    sequence: &dyn SequenceClassifier,
) -> Result<AnalysisOutput> {
    run_analysis_reported(config, source, classifier, sequence, &NoOpReporter)
}
