use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::{ArcjetError, Result};
use crate::io::FrameSource;
use crate::processor::FrameProcessor;
use crate::record::ResultRecord;

use super::types::{BatchOutcome, PipelineStage, ProgressReporter};

/// Handle to a batch running on its own worker thread.
pub struct BatchHandle {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<BatchOutcome>>,
}

impl BatchHandle {
    /// Stop after the frame currently being processed.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the batch to finish.
    pub fn join(self) -> Result<BatchOutcome> {
        self.handle.join().map_err(|_| ArcjetError::WorkerPanicked)?
    }
}

fn check_range(range: &Range<usize>, total: usize) -> Result<()> {
    if range.end > total {
        return Err(ArcjetError::FrameIndexOutOfRange {
            index: range.end.saturating_sub(1),
            total,
        });
    }
    Ok(())
}

/// Read and process one frame. Frame-local failures become `Ok(None)`.
fn process_one(
    source: &dyn FrameSource,
    processor: &mut FrameProcessor,
    index: usize,
) -> Result<Option<ResultRecord>> {
    let result = source
        .read_frame(index)
        .and_then(|frame| processor.process(&frame));
    match result {
        Ok(output) => Ok(Some(output.record)),
        Err(e) if e.is_frame_local() => {
            warn!(frame = index, error = %e, "Skipping frame");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Process `range` on a dedicated worker thread.
///
/// Frames are processed in order through the shared `processor`, locked for
/// one frame at a time so other threads may adjust it between frames.
pub fn spawn_batch(
    source: Arc<dyn FrameSource>,
    processor: Arc<Mutex<FrameProcessor>>,
    range: Range<usize>,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<BatchHandle> {
    check_range(&range, source.frame_count())?;
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);

    let handle = std::thread::Builder::new()
        .name("arcjet-batch".into())
        .spawn(move || {
            reporter.begin_stage(PipelineStage::ProcessingFrames, Some(range.len()));
            let result = run_in_order(
                source.as_ref(),
                &processor,
                range,
                &cancel_flag,
                reporter.as_ref(),
            );
            reporter.finish_stage();
            let outcome = result?;
            info!(
                processed = outcome.records.len(),
                skipped = outcome.skipped.len(),
                "Batch finished"
            );
            Ok(outcome)
        })?;

    Ok(BatchHandle { cancel, handle })
}

fn run_in_order(
    source: &dyn FrameSource,
    processor: &Mutex<FrameProcessor>,
    range: Range<usize>,
    cancel: &AtomicBool,
    reporter: &dyn ProgressReporter,
) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    for (done, index) in range.enumerate() {
        if cancel.load(Ordering::Relaxed) {
            info!(frame = index, "Batch cancelled");
            outcome.cancelled = true;
            break;
        }
        let record = {
            let mut guard = processor.lock().unwrap_or_else(|p| p.into_inner());
            process_one(source, &mut guard, index)?
        };
        match record {
            Some(r) => outcome.records.push(r),
            None => outcome.skipped.push(index),
        }
        reporter.advance(done + 1);
    }
    Ok(outcome)
}

/// Process `range` with independent processor clones across the rayon pool.
///
/// An unset flow direction is resolved on the first frame before fanning
/// out, so every clone agrees on it. The resolved direction is kept in
/// `processor`.
pub fn process_parallel(
    source: &dyn FrameSource,
    processor: &mut FrameProcessor,
    range: Range<usize>,
    reporter: &dyn ProgressReporter,
) -> Result<BatchOutcome> {
    check_range(&range, source.frame_count())?;
    reporter.begin_stage(PipelineStage::ProcessingFrames, Some(range.len()));
    let result = run_parallel(source, processor, range, reporter);
    reporter.finish_stage();
    let outcome = result?;
    info!(
        processed = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "Parallel batch finished"
    );
    Ok(outcome)
}

fn run_parallel(
    source: &dyn FrameSource,
    processor: &mut FrameProcessor,
    range: Range<usize>,
    reporter: &dyn ProgressReporter,
) -> Result<BatchOutcome> {
    let mut results: Vec<(usize, Option<ResultRecord>)> = Vec::with_capacity(range.len());
    let mut rest = range.clone();
    while processor.flow().is_none() {
        let Some(index) = rest.next() else { break };
        results.push((index, process_one(source, processor, index)?));
    }
    let done = AtomicUsize::new(results.len());

    let template: &FrameProcessor = processor;
    let indices: Vec<usize> = rest.collect();
    let run = |worker: &mut FrameProcessor, index: usize| -> Result<(usize, Option<ResultRecord>)> {
        let record = process_one(source, worker, index)?;
        reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
        Ok((index, record))
    };

    let tail: Vec<(usize, Option<ResultRecord>)> = if indices.len() >= PARALLEL_FRAME_THRESHOLD {
        indices
            .par_iter()
            .map_init(|| template.clone(), |worker, &index| run(worker, index))
            .collect::<Result<_>>()?
    } else {
        let mut worker = template.clone();
        indices
            .iter()
            .map(|&index| run(&mut worker, index))
            .collect::<Result<_>>()?
    };
    results.extend(tail);
    results.sort_by_key(|(index, _)| *index);

    let mut outcome = BatchOutcome::default();
    for (index, record) in results {
        match record {
            Some(r) => outcome.records.push(r),
            None => outcome.skipped.push(index),
        }
    }
    Ok(outcome)
}
