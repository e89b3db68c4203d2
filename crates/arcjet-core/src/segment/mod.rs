//! Interchangeable strategies that turn one cropped frame into a
//! model/shock contour pair.

mod auto_hsv;
pub mod config;
mod fixed_hsv;
mod gray;
mod learned;

use std::sync::Arc;

use ndarray::{Array2, Array3};

use crate::color::hsv::rgb_image_to_hsv;
use crate::detection::extract_largest;
use crate::error::{ArcjetError, Result};
use crate::flags::Flags;
use crate::frame::{Frame, PixelData};
use crate::geometry::Contour;

pub use auto_hsv::{AutoHsv, AutoHsvRanges};
pub use config::{SegmentationMethod, SegmenterOptions};
pub use fixed_hsv::FixedHsv;
pub use gray::GrayThreshold;
pub use learned::{LearnedClassifier, PixelClassifier};

/// Contours found in one crop, in crop-local coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segmentation {
    pub model: Option<Contour>,
    pub shock: Option<Contour>,
    /// Flags raised by the strategy, including the contour-failure flags.
    pub flags: Flags,
}

impl Segmentation {
    /// Extract the largest contour of each mask and record misses.
    /// A `None` shock mask means the strategy never looks for a shock.
    pub(crate) fn from_masks(
        model_mask: &Array2<bool>,
        shock_mask: Option<&Array2<bool>>,
        mut flags: Flags,
    ) -> Self {
        let model = extract_largest(model_mask);
        let shock = shock_mask.and_then(extract_largest);
        flags.model_contour_failed = Some(model.is_none());
        flags.shock_contour_failed = Some(shock.is_none());
        Self {
            model,
            shock,
            flags,
        }
    }
}

/// One segmentation strategy.
///
/// `flags` carries what earlier stages decided about the frame (exposure);
/// strategies may adapt to it. Absent contours are reported through the
/// result flags, never as errors.
pub trait Segmenter: Send + Sync {
    fn name(&self) -> &'static str;

    fn segment(&self, crop: &Frame, flags: &Flags) -> Result<Segmentation>;
}

/// Build the strategy selected by `method`.
///
/// `classifier` is required for [`SegmentationMethod::Cnn`] and ignored otherwise.
pub fn build_segmenter(
    method: &SegmentationMethod,
    options: &SegmenterOptions,
    classifier: Option<Arc<dyn PixelClassifier>>,
) -> Result<Arc<dyn Segmenter>> {
    let segmenter: Arc<dyn Segmenter> = match method {
        SegmentationMethod::AutoHsv => Arc::new(AutoHsv::new(
            AutoHsvRanges::default(),
            options.min_shock_pixels,
            options.opening_kernel_size,
        )),
        SegmentationMethod::FixedHsv { model, shock } => {
            Arc::new(FixedHsv::new(*model, *shock, options.blur_sigma))
        }
        SegmentationMethod::Gray { threshold } => {
            Arc::new(GrayThreshold::new(*threshold, options.blur_sigma))
        }
        SegmentationMethod::Cnn => {
            let classifier = classifier
                .ok_or_else(|| ArcjetError::ClassifierUnavailable(method.to_string()))?;
            Arc::new(LearnedClassifier::new(classifier))
        }
    };
    Ok(segmenter)
}

/// HSV view of a color crop. Grayscale crops carry no hue and are rejected.
pub(crate) fn hsv_of(crop: &Frame, strategy: &str) -> Result<Array3<u8>> {
    match &crop.pixels {
        PixelData::Color(rgb) => Ok(rgb_image_to_hsv(rgb)),
        PixelData::Gray(_) => Err(ArcjetError::UnsupportedFrame(format!(
            "{strategy} segmentation needs a color frame"
        ))),
    }
}
