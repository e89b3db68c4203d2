use crate::detection::threshold_mask;
use crate::error::Result;
use crate::filters::blur_gray;
use crate::flags::Flags;
use crate::frame::Frame;

use super::{Segmentation, Segmenter};

/// Intensity-threshold segmentation for frames where hue is unreliable.
///
/// Shock glow is indistinguishable from model material in pure intensity, so
/// the shock is always reported absent.
#[derive(Clone, Debug)]
pub struct GrayThreshold {
    threshold: u8,
    blur_sigma: f32,
}

impl GrayThreshold {
    pub fn new(threshold: u8, blur_sigma: f32) -> Self {
        Self {
            threshold,
            blur_sigma,
        }
    }
}

impl Segmenter for GrayThreshold {
    fn name(&self) -> &'static str {
        "GRAY"
    }

    fn segment(&self, crop: &Frame, _flags: &Flags) -> Result<Segmentation> {
        let smoothed = blur_gray(&crop.to_gray(), self.blur_sigma);
        let model_mask = threshold_mask(&smoothed, self.threshold);
        Ok(Segmentation::from_masks(&model_mask, None, Flags::default()))
    }
}
