use ndarray::Array2;

use crate::consts::{
    GRAY_HISTOGRAM_BINS, MODEL_VISIBLE_LEVEL, OVEREXPOSED_LEVEL, UNDEREXPOSED_LEVEL,
};

/// 256-bin histogram of an 8-bit grayscale image.
pub fn gray_histogram(data: &Array2<u8>) -> Vec<u64> {
    let mut histogram = vec![0u64; GRAY_HISTOGRAM_BINS];
    for &v in data.iter() {
        histogram[v as usize] += 1;
    }
    histogram
}

/// Fraction of histogram mass in bins `>= level`.
pub fn fraction_at_or_above(histogram: &[u64], level: usize) -> f64 {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let upper: u64 = histogram.iter().skip(level).sum();
    upper as f64 / total as f64
}

/// Exposure classification of one crop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExposureClass {
    pub overexposed: bool,
    pub underexposed: bool,
    pub model_visible: bool,
}

impl ExposureClass {
    /// Classify a histogram against `fraction` (e.g. 0.005 for 0.5%).
    ///
    /// Overexposed: more than `fraction` of pixels sit in the saturated top bins.
    /// Underexposed: fewer than `fraction` of pixels are brighter than mid-gray.
    /// Model visible: a bright population above the glow level holds more than
    /// `fraction` of the pixels.
    pub fn from_histogram(histogram: &[u64], fraction: f64) -> Self {
        let saturated = fraction_at_or_above(histogram, OVEREXPOSED_LEVEL);
        let lit = fraction_at_or_above(histogram, UNDEREXPOSED_LEVEL + 1);
        let bright = fraction_at_or_above(histogram, MODEL_VISIBLE_LEVEL);
        Self {
            overexposed: saturated > fraction,
            underexposed: lit < fraction,
            model_visible: bright > fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_frame_is_underexposed() {
        let data = Array2::from_elem((20, 20), 10u8);
        let class = ExposureClass::from_histogram(&gray_histogram(&data), 0.005);
        assert!(class.underexposed);
        assert!(!class.overexposed);
        assert!(!class.model_visible);
    }

    #[test]
    fn saturated_frame_is_overexposed() {
        let data = Array2::from_elem((20, 20), 255u8);
        let class = ExposureClass::from_histogram(&gray_histogram(&data), 0.005);
        assert!(class.overexposed);
        assert!(!class.underexposed);
        assert!(class.model_visible);
    }

    #[test]
    fn empty_histogram_has_zero_fraction() {
        assert_eq!(fraction_at_or_above(&[0; 256], 10), 0.0);
    }
}
