use std::sync::Arc;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_EXPOSURE_FRACTION, DEFAULT_INTERP_TOLERANCE, DEFAULT_RELATIVE_RADII,
    FLOW_INFERENCE_BLUR_SIGMA,
};
use crate::edge::{extract_edge, interpolate, FlowDirection};
use crate::error::Result;
use crate::filters::{gaussian_blur_array, gray_histogram, ExposureClass};
use crate::flags::Flags;
use crate::frame::{CropWindow, Frame};
use crate::geometry::Contour;
use crate::record::{ResultRecord, TargetMeasurement};
use crate::segment::{build_segmenter, PixelClassifier, SegmentationMethod, SegmenterOptions, Segmenter};

/// Per-video processing configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Region of interest. `None` processes the whole frame.
    pub crop: Option<CropWindow>,
    /// Flow direction. `None` infers it from the first processed frame.
    pub flow: Option<FlowDirection>,
    pub segmentation: SegmentationMethod,
    pub segmenter: SegmenterOptions,
    /// Fractions of the edge radius at which positions are sampled.
    pub relative_radii: Vec<f64>,
    /// Maximum perpendicular distance for an edge point to match a sample.
    pub interp_tolerance: f64,
    /// Pixel fraction that trips the exposure flags.
    pub exposure_fraction: f64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            crop: None,
            flow: None,
            segmentation: SegmentationMethod::default(),
            segmenter: SegmenterOptions::default(),
            relative_radii: DEFAULT_RELATIVE_RADII.to_vec(),
            interp_tolerance: DEFAULT_INTERP_TOLERANCE,
            exposure_fraction: DEFAULT_EXPOSURE_FRACTION,
        }
    }
}

/// Result of processing one frame.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// Full model contour in frame-global coordinates.
    pub model_contour: Option<Contour>,
    /// Full shock contour in frame-global coordinates.
    pub shock_contour: Option<Contour>,
    pub record: ResultRecord,
}

/// Stateful per-video orchestrator: crop, flow, exposure, segmentation, edges.
///
/// `process` takes `&mut self` because the inferred flow direction is cached
/// on first use. Share one instance behind a lock, or clone it once the
/// flow direction is known.
#[derive(Clone)]
pub struct FrameProcessor {
    config: ProcessorConfig,
    segmenter: Arc<dyn Segmenter>,
    channels: Option<usize>,
}

impl FrameProcessor {
    /// Build a processor for `config`. `classifier` backs the CNN strategy.
    pub fn new(
        config: ProcessorConfig,
        classifier: Option<Arc<dyn PixelClassifier>>,
    ) -> Result<Self> {
        let segmenter = build_segmenter(&config.segmentation, &config.segmenter, classifier)?;
        Ok(Self::with_segmenter(config, segmenter))
    }

    /// Build a processor around an already constructed strategy.
    pub fn with_segmenter(config: ProcessorConfig, segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            config,
            segmenter,
            channels: None,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn flow(&self) -> Option<FlowDirection> {
        self.config.flow
    }

    pub fn set_flow(&mut self, flow: Option<FlowDirection>) {
        self.config.flow = flow;
    }

    pub fn set_crop(&mut self, crop: Option<CropWindow>) {
        self.config.crop = crop;
    }

    /// Swap the active strategy, keeping crop and flow.
    pub fn set_segmenter(&mut self, segmenter: Arc<dyn Segmenter>) {
        self.segmenter = segmenter;
    }

    pub fn segmenter_name(&self) -> &'static str {
        self.segmenter.name()
    }

    /// Channel count of the frames seen so far.
    pub fn channels(&self) -> Option<usize> {
        self.channels
    }

    /// Segment one frame and measure both silhouettes.
    ///
    /// Crop windows that do not fit the frame are errors. Missing contours
    /// are not: they surface as `None` measurements and failure flags.
    pub fn process(&mut self, frame: &Frame) -> Result<FrameOutput> {
        let window = self
            .config
            .crop
            .unwrap_or_else(|| CropWindow::full(frame.width(), frame.height()));
        let crop = frame.crop(&window)?;
        self.channels = Some(frame.channels());

        let gray = crop.to_gray();
        let flow = match self.config.flow {
            Some(flow) => flow,
            None => {
                let flow = infer_flow(&gray);
                debug!(frame = frame.index(), %flow, "Inferred flow direction");
                self.config.flow = Some(flow);
                flow
            }
        };

        let exposure = ExposureClass::from_histogram(&gray_histogram(&gray), self.config.exposure_fraction);
        let mut flags = Flags {
            overexposed: Some(exposure.overexposed),
            underexposed: Some(exposure.underexposed),
            model_visible: Some(exposure.model_visible),
            ..Flags::default()
        };

        let segmentation = self.segmenter.segment(&crop, &flags)?;
        flags.merge(&segmentation.flags);
        debug!(
            frame = frame.index(),
            strategy = self.segmenter.name(),
            model = segmentation.model.is_some(),
            shock = segmentation.shock.is_some(),
            underexposed = exposure.underexposed,
            overexposed = exposure.overexposed,
            "Segmented frame"
        );

        let (dx, dy) = window.offset();
        let model_contour = segmentation.model.map(|c| c.translated(dx, dy));
        let shock_contour = segmentation.shock.map(|c| c.translated(dx, dy));

        let record = ResultRecord {
            index: frame.index(),
            model: model_contour.as_ref().map(|c| self.measure(c, flow)),
            shock: shock_contour.as_ref().map(|c| self.measure(c, flow)),
            flags,
        };

        Ok(FrameOutput {
            model_contour,
            shock_contour,
            record,
        })
    }

    /// Measure a contour that is already in frame-global coordinates.
    fn measure(&self, contour: &Contour, flow: FlowDirection) -> TargetMeasurement {
        let edge = extract_edge(contour, flow, (0, 0));
        let metrics = interpolate(&edge, flow, &self.config.relative_radii, self.config.interp_tolerance);
        TargetMeasurement {
            edge,
            area: contour.area(),
            centroid: contour.centroid().unwrap_or((f64::NAN, f64::NAN)),
            metrics,
        }
    }
}

impl std::fmt::Debug for FrameProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameProcessor")
            .field("config", &self.config)
            .field("segmenter", &self.segmenter.name())
            .field("channels", &self.channels)
            .finish()
    }
}

/// Guess the flow direction from where the glow is brightest.
///
/// The hottest spot sits on the upstream face of the model, so a bright
/// right half means flow travelling left.
pub fn infer_flow(gray: &Array2<u8>) -> FlowDirection {
    let smoothed = gaussian_blur_array(&gray.mapv(|v| v as f32), FLOW_INFERENCE_BLUR_SIGMA);
    let mut best = (0usize, f32::NEG_INFINITY);
    for ((_, col), &v) in smoothed.indexed_iter() {
        if v > best.1 {
            best = (col, v);
        }
    }
    let midline = gray.ncols() as f64 / 2.0;
    if best.0 as f64 > midline {
        FlowDirection::Left
    } else {
        FlowDirection::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArcjetError;
    use ndarray::s;

    fn gray_block_frame() -> Frame {
        let mut data = Array2::<u8>::zeros((60, 80));
        data.slice_mut(s![20..40, 30..50]).fill(255);
        Frame::gray(data).with_index(4)
    }

    fn gray_config() -> ProcessorConfig {
        ProcessorConfig {
            segmentation: SegmentationMethod::Gray { threshold: 150 },
            flow: Some(FlowDirection::Right),
            ..ProcessorConfig::default()
        }
    }

    #[test]
    fn bright_right_half_means_leftward_flow() {
        let mut data = Array2::<u8>::zeros((20, 40));
        data.slice_mut(s![8..12, 30..34]).fill(250);
        assert_eq!(infer_flow(&data), FlowDirection::Left);
        let mut data = Array2::<u8>::zeros((20, 40));
        data.slice_mut(s![8..12, 4..8]).fill(250);
        assert_eq!(infer_flow(&data), FlowDirection::Right);
    }

    #[test]
    fn flow_is_cached_after_inference() {
        let mut config = gray_config();
        config.flow = None;
        let mut processor = FrameProcessor::new(config, None).unwrap();
        processor.process(&gray_block_frame()).unwrap();
        assert!(processor.flow().is_some());
    }

    #[test]
    fn crop_offset_maps_back_to_frame() {
        let mut config = gray_config();
        config.crop = Some(CropWindow::new(10, 50, 20, 70));
        let mut processor = FrameProcessor::new(config, None).unwrap();
        let out = processor.process(&gray_block_frame()).unwrap();
        let rect = out.model_contour.unwrap().bounding_rect().unwrap();
        assert_eq!((rect.x, rect.y), (30, 20));
        let model = out.record.model.unwrap();
        // Smoothing rounds off the block corners.
        assert!(model.edge.points.iter().all(|p| p.x <= 31));
        let metrics = model.metrics.unwrap();
        assert_eq!((metrics.low, metrics.high), (20.0, 39.0));
        assert_eq!(metrics.stagnation_position(), Some(30.0));
        assert_eq!(out.record.index, 4);
    }

    #[test]
    fn oversized_crop_is_an_error() {
        let mut config = gray_config();
        config.crop = Some(CropWindow::new(0, 61, 0, 80));
        let mut processor = FrameProcessor::new(config, None).unwrap();
        let err = processor.process(&gray_block_frame()).unwrap_err();
        assert!(matches!(err, ArcjetError::InvalidCrop(_)));
    }

    #[test]
    fn exposure_flags_are_recorded() {
        let mut processor = FrameProcessor::new(gray_config(), None).unwrap();
        let out = processor.process(&gray_block_frame()).unwrap();
        assert_eq!(out.record.flags.overexposed, Some(true));
        assert_eq!(out.record.flags.underexposed, Some(false));
        assert_eq!(out.record.flags.shock_contour_failed, Some(true));
    }
}
