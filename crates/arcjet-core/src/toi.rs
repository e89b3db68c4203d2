//! Time-of-interest detection: find the stretch of a video where the test
//! article is actually in the plasma stream.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{
    DEFAULT_TOI_SEQUENCE_LEN, DEFAULT_TOI_SMOOTHING, DEFAULT_TOI_STRIDE, PARALLEL_FRAME_THRESHOLD,
    TOI_LABEL_THRESHOLD,
};
use crate::detection::compute_mean_stddev;
use crate::error::{ArcjetError, Result};
use crate::frame::CropWindow;
use crate::io::FrameSource;
use crate::pipeline::{PipelineStage, ProgressReporter};

/// Labels a fixed-length `[0, 1]` brightness sequence position by position.
///
/// Implementations receive exactly `output_len()` samples and return as many
/// scores; scores above 0.5 mean "test in progress".
pub trait SequenceClassifier: Send + Sync {
    fn output_len(&self) -> usize;

    fn classify(&self, signal: &[f32]) -> Result<Vec<f32>>;
}

/// Labels every position whose normalised brightness exceeds a threshold.
#[derive(Clone, Debug)]
pub struct ThresholdClassifier {
    len: usize,
    threshold: f32,
}

impl ThresholdClassifier {
    pub fn new(len: usize, threshold: f32) -> Self {
        Self { len, threshold }
    }
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOI_SEQUENCE_LEN, TOI_LABEL_THRESHOLD)
    }
}

impl SequenceClassifier for ThresholdClassifier {
    fn output_len(&self) -> usize {
        self.len
    }

    fn classify(&self, signal: &[f32]) -> Result<Vec<f32>> {
        if signal.len() != self.len {
            return Err(ArcjetError::Classifier(format!(
                "expected {} samples, got {}",
                self.len,
                signal.len()
            )));
        }
        Ok(signal
            .iter()
            .map(|&v| if v > self.threshold { 1.0 } else { 0.0 })
            .collect())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToiConfig {
    /// Sample every `stride`-th frame.
    pub stride: usize,
    /// Centred moving-average window applied before normalisation.
    pub smoothing: usize,
}

impl Default for ToiConfig {
    fn default() -> Self {
        Self {
            stride: DEFAULT_TOI_STRIDE,
            smoothing: DEFAULT_TOI_SMOOTHING,
        }
    }
}

/// Recommended usable frame range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeOfInterest {
    pub first: usize,
    pub last: usize,
    /// Every detected run in classifier positions, inclusive.
    pub runs: Vec<(usize, usize)>,
}

/// Mean grey level of every `stride`-th frame, optionally inside `crop`.
pub fn brightness_signal(
    source: &dyn FrameSource,
    stride: usize,
    crop: Option<&CropWindow>,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<f64>> {
    let stride = stride.max(1);
    let indices: Vec<usize> = (0..source.frame_count()).step_by(stride).collect();
    if indices.is_empty() {
        return Err(ArcjetError::EmptySequence);
    }
    reporter.begin_stage(PipelineStage::SamplingBrightness, Some(indices.len()));

    let sample = |i: usize| -> Result<f64> {
        let frame = source.read_frame(i)?;
        let frame = match crop {
            Some(window) => frame.crop(window)?,
            None => frame,
        };
        let (mean, _) = compute_mean_stddev(&frame.to_gray());
        Ok(mean)
    };

    let signal = if indices.len() >= PARALLEL_FRAME_THRESHOLD {
        indices.par_iter().map(|&i| sample(i)).collect::<Result<Vec<f64>>>()?
    } else {
        indices.iter().map(|&i| sample(i)).collect::<Result<Vec<f64>>>()?
    };

    reporter.advance(indices.len());
    reporter.finish_stage();
    debug!(samples = signal.len(), stride, "Sampled brightness");
    Ok(signal)
}

/// Centred moving average. The window shrinks at the ends.
pub fn smooth(signal: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || signal.is_empty() {
        return signal.to_vec();
    }
    let half = window / 2;
    (0..signal.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(signal.len());
            signal[lo..hi].iter().sum::<f64>() / (hi - lo) as f64
        })
        .collect()
}

/// Min-max normalisation to `[0, 1]`. A flat signal maps to all zeros.
pub fn normalize(signal: &[f64]) -> Vec<f64> {
    let min = signal.iter().copied().fold(f64::INFINITY, f64::min);
    let max = signal.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return vec![0.0; signal.len()];
    }
    signal.iter().map(|v| (v - min) / span).collect()
}

/// Linear resampling to exactly `len` points spanning the same extent.
pub fn resample(signal: &[f64], len: usize) -> Vec<f32> {
    match (signal.len(), len) {
        (_, 0) | (0, _) => vec![0.0; len],
        (1, _) => vec![signal[0] as f32; len],
        (n, 1) => vec![signal[n / 2] as f32],
        (n, _) => (0..len)
            .map(|k| {
                let pos = k as f64 * (n - 1) as f64 / (len - 1) as f64;
                let i = (pos.floor() as usize).min(n - 2);
                let frac = pos - i as f64;
                (signal[i] * (1.0 - frac) + signal[i + 1] * frac) as f32
            })
            .collect(),
    }
}

/// Inclusive `(start, end)` runs of positions scoring above 0.5.
pub fn run_boundaries(labels: &[f32]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &v) in labels.iter().enumerate() {
        let high = v > TOI_LABEL_THRESHOLD;
        match (high, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, labels.len() - 1));
    }
    runs
}

/// Map a classifier position back to a frame index.
fn rescale(pos: usize, out_len: usize, frame_count: usize) -> usize {
    if out_len <= 1 || frame_count == 0 {
        return 0;
    }
    let frame = (pos as f64 * (frame_count - 1) as f64 / (out_len - 1) as f64).round() as usize;
    frame.min(frame_count - 1)
}

/// Classify a sampled brightness signal and return the usable frame range.
///
/// `Ok(None)` means the classifier found nothing of interest.
pub fn time_of_interest(
    brightness: &[f64],
    frame_count: usize,
    config: &ToiConfig,
    classifier: &dyn SequenceClassifier,
) -> Result<Option<TimeOfInterest>> {
    if brightness.is_empty() || frame_count == 0 {
        return Err(ArcjetError::EmptySequence);
    }

    let prepared = normalize(&smooth(brightness, config.smoothing));
    let out_len = classifier.output_len();
    let labels = classifier.classify(&resample(&prepared, out_len))?;
    if labels.len() != out_len {
        return Err(ArcjetError::Classifier(format!(
            "classifier returned {} labels, expected {out_len}",
            labels.len()
        )));
    }

    let runs = run_boundaries(&labels);
    let (Some(&(first, _)), Some(&(_, last))) = (runs.first(), runs.last()) else {
        info!("No time of interest detected");
        return Ok(None);
    };

    let toi = TimeOfInterest {
        first: rescale(first, out_len, frame_count),
        last: rescale(last, out_len, frame_count),
        runs,
    };
    info!(first = toi.first, last = toi.last, runs = toi.runs.len(), "Time of interest");
    Ok(Some(toi))
}
