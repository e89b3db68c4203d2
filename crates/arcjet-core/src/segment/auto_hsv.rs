use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::hsv::{hsv_filter, HsvRange};
use crate::detection::{foreground_count, morphological_opening, StructuringElement};
use crate::error::Result;
use crate::flags::Flags;
use crate::frame::Frame;

use super::{hsv_of, Segmentation, Segmenter};

/// White-hot and orange surface glow of the test article.
pub const MODEL_RANGES: [HsvRange; 2] = [
    HsvRange::new([0, 0, 200], [180, 70, 255]),
    HsvRange::new([5, 70, 170], [30, 255, 255]),
];

/// Wider model ranges for underexposed frames.
pub const UNDEREXPOSED_MODEL_RANGES: [HsvRange; 2] = [
    HsvRange::new([0, 0, 140], [180, 90, 255]),
    HsvRange::new([0, 50, 90], [35, 255, 255]),
];

/// Violet/pink bow-shock emission.
pub const SHOCK_RANGES: [HsvRange; 1] = [HsvRange::new([125, 60, 120], [170, 255, 255])];

/// Dim-tolerant shock ranges used when the primary shock mask is too small.
pub const DIM_SHOCK_RANGES: [HsvRange; 1] = [HsvRange::new([110, 30, 40], [175, 255, 255])];

/// Range sets used by [`AutoHsv`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoHsvRanges {
    pub model: Vec<HsvRange>,
    pub underexposed_model: Vec<HsvRange>,
    pub shock: Vec<HsvRange>,
    pub dim_shock: Vec<HsvRange>,
}

impl Default for AutoHsvRanges {
    fn default() -> Self {
        Self {
            model: MODEL_RANGES.to_vec(),
            underexposed_model: UNDEREXPOSED_MODEL_RANGES.to_vec(),
            shock: SHOCK_RANGES.to_vec(),
            dim_shock: DIM_SHOCK_RANGES.to_vec(),
        }
    }
}

/// HSV segmentation with hand-tuned ranges that adapts to exposure.
#[derive(Clone, Debug)]
pub struct AutoHsv {
    ranges: AutoHsvRanges,
    min_shock_pixels: usize,
    kernel: StructuringElement,
}

impl AutoHsv {
    pub fn new(ranges: AutoHsvRanges, min_shock_pixels: usize, opening_kernel_size: usize) -> Self {
        Self {
            ranges,
            min_shock_pixels,
            kernel: StructuringElement::ellipse(opening_kernel_size),
        }
    }
}

impl Segmenter for AutoHsv {
    fn name(&self) -> &'static str {
        "AutoHSV"
    }

    fn segment(&self, crop: &Frame, flags: &Flags) -> Result<Segmentation> {
        let hsv = hsv_of(crop, self.name())?;
        let underexposed = flags.is_underexposed();
        let mut out_flags = Flags::default();

        let mut shock_mask = hsv_filter(&hsv, &self.ranges.shock);
        let shock_pixels = foreground_count(&shock_mask);
        let dim = shock_pixels < self.min_shock_pixels;
        out_flags.dim_shock = Some(dim);
        if dim {
            debug!(shock_pixels, "Dim shock, retrying with extended ranges");
            shock_mask = hsv_filter(&hsv, &self.ranges.dim_shock);
        }

        let mut model_mask = if underexposed {
            hsv_filter(&hsv, &self.ranges.underexposed_model)
        } else {
            hsv_filter(&hsv, &self.ranges.model)
        };

        if underexposed {
            model_mask = morphological_opening(&model_mask, &self.kernel);
            shock_mask = morphological_opening(&shock_mask, &self.kernel);
        }

        Ok(Segmentation::from_masks(
            &model_mask,
            Some(&shock_mask),
            out_flags,
        ))
    }
}
