//! Records to calibrated, outlier-masked time series.

pub mod config;
pub mod lof;

use tracing::{info, warn};

use crate::error::{ArcjetError, Result};
use crate::record::{ResultRecord, Target};

pub use config::{ReductionConfig, Units};
pub use lof::local_outlier_factor;

/// Number of features scored for outliers: model area, axis position,
/// radius, centre.
pub const FEATURE_COUNT: usize = 4;

/// One named column of samples aligned with [`TimeSeries::indices`].
/// Missing samples are NaN.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub name: String,
    pub values: Vec<f64>,
}

impl Channel {
    fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Calibrated per-frame metrics for one analysis session.
#[derive(Clone, Debug)]
pub struct TimeSeries {
    /// Frame index of each retained sample.
    pub indices: Vec<usize>,
    /// Seconds since frame 0.
    pub time: Vec<f64>,
    /// Length-valued channels multiplied by `scale`.
    pub physical: Vec<Channel>,
    /// Channels in pixel units.
    pub pixel: Vec<Channel>,
    pub inlier: Vec<bool>,
    pub outlier_score: Vec<f64>,
    /// Physical length per pixel. NaN when no inlier had a usable radius.
    pub scale: f64,
    pub config: ReductionConfig,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn physical_channel(&self, name: &str) -> Option<&[f64]> {
        self.physical
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn pixel_channel(&self, name: &str) -> Option<&[f64]> {
        self.pixel
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn inlier_count(&self) -> usize {
        self.inlier.iter().filter(|&&v| v).count()
    }
}

/// Channel suffix for a relative radius, e.g. `-0.95`, `0.00`.
pub fn radius_label(r: f64) -> String {
    format!("{r:.2}")
}

/// Radius closest to the centre line; used as the axis position.
fn axis_radius(radii: &[f64]) -> Option<f64> {
    radii
        .iter()
        .copied()
        .min_by(|a, b| a.abs().total_cmp(&b.abs()))
}

fn opt(v: Option<f64>) -> f64 {
    v.unwrap_or(f64::NAN)
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Replace NaNs with the column median, then centre on the median and divide
/// by the median absolute deviation (1 when the column has no spread).
fn robust_standardize(features: &mut [[f64; FEATURE_COUNT]]) {
    for col in 0..FEATURE_COUNT {
        let mut finite: Vec<f64> = features
            .iter()
            .map(|f| f[col])
            .filter(|v| v.is_finite())
            .collect();
        let center = median(&mut finite).unwrap_or(0.0);
        let mut deviations: Vec<f64> = finite.iter().map(|v| (v - center).abs()).collect();
        let mad = match median(&mut deviations) {
            Some(m) if m > 0.0 => m,
            _ => 1.0,
        };
        for f in features.iter_mut() {
            let v = if f[col].is_finite() { f[col] } else { center };
            f[col] = (v - center) / mad;
        }
    }
}

/// Label each feature row inlier (`true`) or outlier by its LOF score.
pub fn outlier_mask(
    features: &[[f64; FEATURE_COUNT]],
    neighbors: usize,
    threshold: f64,
) -> (Vec<bool>, Vec<f64>) {
    let mut scaled = features.to_vec();
    robust_standardize(&mut scaled);
    let points: Vec<Vec<f64>> = scaled.iter().map(|f| f.to_vec()).collect();
    let scores = local_outlier_factor(&points, neighbors);
    let mask = scores.iter().map(|&s| s <= threshold).collect();
    (mask, scores)
}

/// `diameter / (2 * max inlier radius)`, NaN without a usable radius.
pub fn pixel_scale(radii: &[f64], inlier: &[bool], diameter: f64) -> f64 {
    let max_radius = radii
        .iter()
        .zip(inlier)
        .filter(|&(r, &ok)| ok && r.is_finite() && *r > 0.0)
        .map(|(&r, _)| r)
        .fold(f64::NAN, f64::max);
    if max_radius.is_nan() {
        f64::NAN
    } else {
        diameter / (2.0 * max_radius)
    }
}

/// Build the calibrated time series for `records`.
///
/// Records are ordered by frame index and every `stride`-th one is kept.
/// Unmatched interpolated positions (stored as 0) become NaN samples.
/// Fails when no diameter is configured or nothing remains to reduce.
pub fn reduce(records: &[ResultRecord], config: &ReductionConfig) -> Result<TimeSeries> {
    let diameter = config.diameter.ok_or(ArcjetError::MissingDiameter)?;
    if config.stride == 0 {
        return Err(ArcjetError::InvalidConfig("stride must be at least 1".into()));
    }
    if config.frame_rate <= 0.0 {
        return Err(ArcjetError::InvalidConfig("frame rate must be positive".into()));
    }

    let mut ordered: Vec<&ResultRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.index);
    let kept: Vec<&ResultRecord> = ordered.into_iter().step_by(config.stride).collect();
    if kept.is_empty() {
        return Err(ArcjetError::EmptySequence);
    }

    let radii: Vec<f64> = kept
        .iter()
        .find_map(|r| r.metrics(Target::Model).or_else(|| r.metrics(Target::Shock)))
        .map(|m| m.relative_radii.clone())
        .unwrap_or_default();
    let axis = axis_radius(&radii);

    let features: Vec<[f64; FEATURE_COUNT]> = kept
        .iter()
        .map(|r| {
            [
                opt(r.area(Target::Model)),
                opt(axis.and_then(|a| r.matched_position(Target::Model, a))),
                opt(r.radius(Target::Model)),
                opt(r.center(Target::Model)),
            ]
        })
        .collect();

    let (inlier, outlier_score) = outlier_mask(&features, config.neighbors, config.lof_threshold);
    let model_radius: Vec<f64> = features.iter().map(|f| f[2]).collect();
    let scale = pixel_scale(&model_radius, &inlier, diameter);
    if scale.is_nan() {
        warn!("No inlier model radius, calibrated channels will be NaN");
    }

    let indices: Vec<usize> = kept.iter().map(|r| r.index).collect();
    let time = indices.iter().map(|&i| i as f64 / config.frame_rate).collect();

    let mut pixel = Vec::new();
    for target in Target::ALL {
        let p = target.prefix();
        pixel.push(Channel::new(format!("{p}_AREA"), column(&kept, |r| r.area(target))));
        pixel.push(Channel::new(format!("{p}_RADIUS"), column(&kept, |r| r.radius(target))));
        pixel.push(Channel::new(format!("{p}_YCENTER"), column(&kept, |r| r.center(target))));
        for &rr in &radii {
            pixel.push(Channel::new(
                format!("{p}_XPOS_{}", radius_label(rr)),
                column(&kept, |r| r.matched_position(target, rr)),
            ));
        }
    }
    for &rr in &radii {
        pixel.push(Channel::new(
            format!("STANDOFF_{}", radius_label(rr)),
            column(&kept, |r| standoff(r, rr)),
        ));
    }

    // Every pixel channel except areas is a length.
    let mut physical: Vec<Channel> = pixel
        .iter()
        .filter(|c| !c.name.ends_with("_AREA"))
        .map(|c| Channel::new(c.name.clone(), c.values.iter().map(|v| v * scale).collect()))
        .collect();

    let sign = config.flow.map_or(1.0, |f| f.downstream_sign());
    for &rr in &radii {
        let positions = column(&kept, |r| r.matched_position(Target::Model, rr));
        let reference = positions
            .iter()
            .zip(&inlier)
            .find(|&(v, &ok)| ok && v.is_finite())
            .map(|(&v, _)| v);
        let values = positions
            .iter()
            .map(|&v| match reference {
                Some(r0) => (v - r0) * sign * scale,
                None => f64::NAN,
            })
            .collect();
        physical.push(Channel::new(
            format!("MODEL_RECESSION_{}", radius_label(rr)),
            values,
        ));
    }

    let series = TimeSeries {
        indices,
        time,
        physical,
        pixel,
        inlier,
        outlier_score,
        scale,
        config: config.clone(),
    };
    info!(
        samples = series.len(),
        inliers = series.inlier_count(),
        scale,
        units = %config.units,
        "Reduced records"
    );
    Ok(series)
}

fn column(kept: &[&ResultRecord], f: impl Fn(&ResultRecord) -> Option<f64>) -> Vec<f64> {
    kept.iter().map(|r| opt(f(r))).collect()
}

fn standoff(record: &ResultRecord, rr: f64) -> Option<f64> {
    let shock = record.matched_position(Target::Shock, rr)?;
    let model = record.matched_position(Target::Model, rr)?;
    Some((shock - model).abs())
}
