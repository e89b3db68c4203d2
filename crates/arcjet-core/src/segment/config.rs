use serde::{Deserialize, Serialize};

use crate::color::hsv::HsvRange;
use crate::consts::{
    DEFAULT_BLUR_SIGMA, DEFAULT_GRAY_THRESHOLD, DEFAULT_MIN_SHOCK_PIXELS, OPENING_KERNEL_SIZE,
};
use crate::error::ArcjetError;

use super::auto_hsv::{MODEL_RANGES, SHOCK_RANGES};

/// Segmentation strategy selector.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentationMethod {
    /// Hand-tuned HSV ranges with exposure-aware widening.
    #[default]
    AutoHsv,
    /// One caller-supplied HSV range per target, after Gaussian smoothing.
    FixedHsv { model: HsvRange, shock: HsvRange },
    /// Global intensity threshold; model only.
    Gray { threshold: u8 },
    /// External per-pixel classifier.
    Cnn,
}

impl SegmentationMethod {
    /// Fixed-HSV selector seeded with the primary automatic ranges.
    pub fn default_fixed_hsv() -> Self {
        Self::FixedHsv {
            model: MODEL_RANGES[0],
            shock: SHOCK_RANGES[0],
        }
    }
}

impl std::fmt::Display for SegmentationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AutoHsv => write!(f, "AutoHSV"),
            Self::FixedHsv { .. } => write!(f, "HSV"),
            Self::Gray { threshold } => write!(f, "GRAY (threshold {threshold})"),
            Self::Cnn => write!(f, "CNN"),
        }
    }
}

impl std::str::FromStr for SegmentationMethod {
    type Err = ArcjetError;

    /// Accepts the selector names `AUTO`/`AUTOHSV`, `HSV`, `GRAY`, `CNN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTO" | "AUTOHSV" => Ok(Self::AutoHsv),
            "HSV" => Ok(Self::default_fixed_hsv()),
            "GRAY" | "GREY" => Ok(Self::Gray {
                threshold: DEFAULT_GRAY_THRESHOLD,
            }),
            "CNN" => Ok(Self::Cnn),
            other => Err(ArcjetError::InvalidConfig(format!(
                "unknown segmentation method '{other}'"
            ))),
        }
    }
}

/// Numeric knobs shared by the strategies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterOptions {
    /// Gaussian sigma for the smoothing pre-pass (fixed-HSV and gray).
    pub blur_sigma: f32,
    /// Shock masks below this pixel count trigger the dim-shock retry.
    pub min_shock_pixels: usize,
    /// Elliptical kernel diameter for opening underexposed masks.
    pub opening_kernel_size: usize,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            blur_sigma: DEFAULT_BLUR_SIGMA,
            min_shock_pixels: DEFAULT_MIN_SHOCK_PIXELS,
            opening_kernel_size: OPENING_KERNEL_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_names_parse() {
        assert_eq!("auto".parse::<SegmentationMethod>().unwrap(), SegmentationMethod::AutoHsv);
        assert_eq!("CNN".parse::<SegmentationMethod>().unwrap(), SegmentationMethod::Cnn);
        assert_eq!(
            "gray".parse::<SegmentationMethod>().unwrap(),
            SegmentationMethod::Gray { threshold: 150 }
        );
        assert!(matches!(
            "hsv".parse::<SegmentationMethod>().unwrap(),
            SegmentationMethod::FixedHsv { .. }
        ));
        assert!("sam".parse::<SegmentationMethod>().is_err());
    }

    #[test]
    fn method_round_trips_through_toml() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            method: SegmentationMethod,
        }
        let original = Wrapper {
            method: SegmentationMethod::Gray { threshold: 90 },
        };
        let text = toml::to_string(&original).unwrap();
        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back.method, SegmentationMethod::Gray { threshold: 90 });
    }
}
