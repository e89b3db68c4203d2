use crate::color::hsv::{hsv_filter, rgb_image_to_hsv, HsvRange};
use crate::error::{ArcjetError, Result};
use crate::filters::blur_color;
use crate::flags::Flags;
use crate::frame::{Frame, PixelData};

use super::{Segmentation, Segmenter};

/// HSV segmentation with exactly one caller-supplied range per target.
#[derive(Clone, Debug)]
pub struct FixedHsv {
    model: HsvRange,
    shock: HsvRange,
    blur_sigma: f32,
}

impl FixedHsv {
    pub fn new(model: HsvRange, shock: HsvRange, blur_sigma: f32) -> Self {
        Self {
            model,
            shock,
            blur_sigma,
        }
    }
}

impl Segmenter for FixedHsv {
    fn name(&self) -> &'static str {
        "HSV"
    }

    fn segment(&self, crop: &Frame, _flags: &Flags) -> Result<Segmentation> {
        let PixelData::Color(rgb) = &crop.pixels else {
            return Err(ArcjetError::UnsupportedFrame(
                "HSV segmentation needs a color frame".into(),
            ));
        };
        let hsv = rgb_image_to_hsv(&blur_color(rgb, self.blur_sigma));

        let model_mask = hsv_filter(&hsv, &[self.model]);
        let shock_mask = hsv_filter(&hsv, &[self.shock]);

        Ok(Segmentation::from_masks(
            &model_mask,
            Some(&shock_mask),
            Flags::default(),
        ))
    }
}
