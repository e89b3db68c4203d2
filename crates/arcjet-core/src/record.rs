//! Per-frame result records.
//!
//! In memory a record nests one [`TargetMeasurement`] per tracked silhouette.
//! On disk it is a flat object with `SCREAMING_SNAKE_CASE` keys prefixed by
//! the target name (`MODEL_AREA`, `SHOCK_INTERP_XPOS`, ...) and the flags
//! flattened alongside.

use serde::{Deserialize, Serialize};

use crate::edge::{Edge, EdgeMetrics};
use crate::flags::Flags;

/// The two silhouettes tracked in every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Model,
    Shock,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Model, Target::Shock];

    /// Key prefix used in persisted records and series channels.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Model => "MODEL",
            Self::Shock => "SHOCK",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Everything derived from one silhouette.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetMeasurement {
    /// Leading edge in frame-global coordinates.
    pub edge: Edge,
    /// Area enclosed by the full contour, in square pixels.
    pub area: f64,
    /// Area centroid `(x, y)` in frame-global coordinates.
    pub centroid: (f64, f64),
    /// `None` when the edge was empty.
    pub metrics: Option<EdgeMetrics>,
}

/// One processed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordRepr", into = "RecordRepr")]
pub struct ResultRecord {
    pub index: usize,
    pub model: Option<TargetMeasurement>,
    pub shock: Option<TargetMeasurement>,
    pub flags: Flags,
}

impl ResultRecord {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            model: None,
            shock: None,
            flags: Flags::default(),
        }
    }

    pub fn target(&self, target: Target) -> Option<&TargetMeasurement> {
        match target {
            Target::Model => self.model.as_ref(),
            Target::Shock => self.shock.as_ref(),
        }
    }

    pub fn metrics(&self, target: Target) -> Option<&EdgeMetrics> {
        self.target(target).and_then(|m| m.metrics.as_ref())
    }

    pub fn area(&self, target: Target) -> Option<f64> {
        self.target(target).map(|m| m.area)
    }

    pub fn radius(&self, target: Target) -> Option<f64> {
        self.metrics(target).map(|m| m.radius)
    }

    pub fn center(&self, target: Target) -> Option<f64> {
        self.metrics(target).map(|m| m.center)
    }

    pub fn position_at(&self, target: Target, relative_radius: f64) -> Option<f64> {
        self.metrics(target).and_then(|m| m.position_at(relative_radius))
    }

    /// Position at `relative_radius`, `None` when interpolation found no edge point.
    pub fn matched_position(&self, target: Target, relative_radius: f64) -> Option<f64> {
        self.metrics(target)
            .and_then(|m| m.matched_position_at(relative_radius))
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RecordRepr {
    index: usize,
    #[serde(default)]
    model: Option<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_centroid: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_r: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_ycenter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_ylow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_crop_ymax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_interp_xpos: Option<Vec<f64>>,
    #[serde(default)]
    shock: Option<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shock_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shock_centroid: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shock_r: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shock_ycenter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shock_ylow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shock_crop_ymax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shock_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shock_interp_xpos: Option<Vec<f64>>,
    #[serde(flatten)]
    flags: Flags,
}

/// Flat view of one target's fields, shared by both directions of the conversion.
struct TargetFields {
    edge: Option<Edge>,
    area: Option<f64>,
    centroid: Option<[f64; 2]>,
    r: Option<Vec<f64>>,
    ycenter: Option<f64>,
    ylow: Option<f64>,
    crop_ymax: Option<f64>,
    radius: Option<f64>,
    interp_xpos: Option<Vec<f64>>,
}

impl TargetFields {
    fn flatten(m: Option<TargetMeasurement>) -> Self {
        let Some(m) = m else {
            return Self {
                edge: None,
                area: None,
                centroid: None,
                r: None,
                ycenter: None,
                ylow: None,
                crop_ymax: None,
                radius: None,
                interp_xpos: None,
            };
        };
        let metrics = m.metrics;
        Self {
            edge: Some(m.edge),
            area: Some(m.area),
            centroid: Some([m.centroid.0, m.centroid.1]),
            r: metrics.as_ref().map(|e| e.relative_radii.clone()),
            ycenter: metrics.as_ref().map(|e| e.center),
            ylow: metrics.as_ref().map(|e| e.low),
            crop_ymax: metrics.as_ref().map(|e| e.high),
            radius: metrics.as_ref().map(|e| e.radius),
            interp_xpos: metrics.map(|e| e.positions),
        }
    }

    fn nest(self) -> Option<TargetMeasurement> {
        let edge = self.edge?;
        let metrics = match (self.r, self.ycenter, self.ylow, self.crop_ymax, self.radius, self.interp_xpos) {
            (Some(relative_radii), Some(center), Some(low), Some(high), Some(radius), Some(positions))
                if relative_radii.len() == positions.len() =>
            {
                Some(EdgeMetrics {
                    relative_radii,
                    center,
                    low,
                    high,
                    radius,
                    positions,
                })
            }
            _ => None,
        };
        let [cx, cy] = self.centroid.unwrap_or([f64::NAN, f64::NAN]);
        Some(TargetMeasurement {
            edge,
            area: self.area.unwrap_or(0.0),
            centroid: (cx, cy),
            metrics,
        })
    }
}

impl From<ResultRecord> for RecordRepr {
    fn from(rec: ResultRecord) -> Self {
        let m = TargetFields::flatten(rec.model);
        let s = TargetFields::flatten(rec.shock);
        Self {
            index: rec.index,
            model: m.edge,
            model_area: m.area,
            model_centroid: m.centroid,
            model_r: m.r,
            model_ycenter: m.ycenter,
            model_ylow: m.ylow,
            model_crop_ymax: m.crop_ymax,
            model_radius: m.radius,
            model_interp_xpos: m.interp_xpos,
            shock: s.edge,
            shock_area: s.area,
            shock_centroid: s.centroid,
            shock_r: s.r,
            shock_ycenter: s.ycenter,
            shock_ylow: s.ylow,
            shock_crop_ymax: s.crop_ymax,
            shock_radius: s.radius,
            shock_interp_xpos: s.interp_xpos,
            flags: rec.flags,
        }
    }
}

impl From<RecordRepr> for ResultRecord {
    fn from(r: RecordRepr) -> Self {
        let model = TargetFields {
            edge: r.model,
            area: r.model_area,
            centroid: r.model_centroid,
            r: r.model_r,
            ycenter: r.model_ycenter,
            ylow: r.model_ylow,
            crop_ymax: r.model_crop_ymax,
            radius: r.model_radius,
            interp_xpos: r.model_interp_xpos,
        };
        let shock = TargetFields {
            edge: r.shock,
            area: r.shock_area,
            centroid: r.shock_centroid,
            r: r.shock_r,
            ycenter: r.shock_ycenter,
            ylow: r.shock_ylow,
            crop_ymax: r.shock_crop_ymax,
            radius: r.shock_radius,
            interp_xpos: r.shock_interp_xpos,
        };
        Self {
            index: r.index,
            model: model.nest(),
            shock: shock.nest(),
            flags: r.flags,
        }
    }
}
