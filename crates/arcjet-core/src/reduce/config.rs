use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FRAME_RATE, DEFAULT_LOF_THRESHOLD, DEFAULT_OUTLIER_NEIGHBORS};
use crate::edge::FlowDirection;
use crate::error::ArcjetError;

const MM_PER_INCH: f64 = 25.4;

/// Length unit of calibrated channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
}

impl Units {
    pub fn label(self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Inches => "in",
        }
    }

    /// Convert a length expressed in `self` into `to`.
    pub fn convert(self, value: f64, to: Units) -> f64 {
        match (self, to) {
            (Self::Millimeters, Self::Inches) => value / MM_PER_INCH,
            (Self::Inches, Self::Millimeters) => value * MM_PER_INCH,
            _ => value,
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Units {
    type Err = ArcjetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeters" | "millimetres" => Ok(Self::Millimeters),
            "in" | "inch" | "inches" => Ok(Self::Inches),
            other => Err(ArcjetError::InvalidConfig(format!("unknown unit '{other}'"))),
        }
    }
}

/// Temporal reduction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    /// Keep every `stride`-th record.
    pub stride: usize,
    /// Physical model diameter in `units`. Required for calibration.
    pub diameter: Option<f64>,
    pub units: Units,
    /// Camera frame rate in frames per second.
    pub frame_rate: f64,
    /// Neighbour count for outlier scoring.
    pub neighbors: usize,
    /// Outlier factor above which a frame is rejected.
    pub lof_threshold: f64,
    /// Flow direction, used to sign model recession. Unknown counts as
    /// rightward.
    pub flow: Option<FlowDirection>,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            stride: 1,
            diameter: None,
            units: Units::default(),
            frame_rate: DEFAULT_FRAME_RATE,
            neighbors: DEFAULT_OUTLIER_NEIGHBORS,
            lof_threshold: DEFAULT_LOF_THRESHOLD,
            flow: None,
        }
    }
}

impl ReductionConfig {
    /// Free-form summary stored alongside exported tables.
    pub fn summary(&self) -> String {
        let diameter = self
            .diameter
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".into());
        format!(
            "units={};diameter={};fps={};stride={}",
            self.units, diameter, self.frame_rate, self.stride
        )
    }
}
