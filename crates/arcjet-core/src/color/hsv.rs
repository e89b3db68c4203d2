use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::consts::HUE_MAX;

/// Inclusive `(hue, saturation, value)` bounds.
///
/// Hue is in `[0, 180]`, saturation and value in `[0, 255]`. Bounds are not
/// validated: a range whose lower bound exceeds its upper bound on any
/// component simply matches nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

/// Convert one RGB pixel to 8-bit HSV (hue halved into `[0, 180)`).
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };
    let h = (h / 2.0).round() as u16 % HUE_MAX as u16;

    [h as u8, s.round() as u8, v as u8]
}

/// Convert an RGB image of shape (h, w, 3) to HSV of the same shape.
pub fn rgb_image_to_hsv(rgb: &Array3<u8>) -> Array3<u8> {
    let (h, w, _) = rgb.dim();
    let mut out = Array3::<u8>::zeros((h, w, 3));
    for row in 0..h {
        for col in 0..w {
            let hsv = rgb_to_hsv(rgb[[row, col, 0]], rgb[[row, col, 1]], rgb[[row, col, 2]]);
            for c in 0..3 {
                out[[row, col, c]] = hsv[c];
            }
        }
    }
    out
}

/// Binary mask of pixels falling inside any of `ranges` (logical OR).
pub fn hsv_filter(hsv: &Array3<u8>, ranges: &[HsvRange]) -> Array2<bool> {
    let (h, w, _) = hsv.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        let px = [hsv[[row, col, 0]], hsv[[row, col, 1]], hsv[[row, col, 2]]];
        ranges.iter().any(|r| r.contains(px))
    })
}
