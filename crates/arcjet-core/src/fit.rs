//! Weighted least-squares polynomial fits of time-series channels.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ArcjetError;
use crate::reduce::TimeSeries;

/// Fits need strictly more samples than this.
pub const MIN_FIT_SAMPLES: usize = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitOrder {
    #[default]
    Linear,
    Quadratic,
}

impl FitOrder {
    pub fn degree(self) -> usize {
        match self {
            Self::Linear => 1,
            Self::Quadratic => 2,
        }
    }
}

impl std::str::FromStr for FitOrder {
    type Err = ArcjetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "linear" => Ok(Self::Linear),
            "2" | "quadratic" => Ok(Self::Quadratic),
            other => Err(ArcjetError::InvalidConfig(format!("unsupported fit order '{other}'"))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Half-open time window `[t0, t1)` in seconds. `None` uses every sample.
    pub window: Option<(f64, f64)>,
    pub order: FitOrder,
    /// Also fit the pixel-unit channels (reported with a `_PX` suffix).
    pub include_pixel: bool,
}

/// Coefficients in ascending power order with their standard errors.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub samples: usize,
}

impl MetricFit {
    /// Value of the fitted polynomial at `t`.
    pub fn eval(&self, t: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }
}

/// Why a metric was not fitted. Never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientData { samples: usize },
    Singular,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientData { samples } => write!(f, "insufficient data ({samples} samples)"),
            Self::Singular => write!(f, "singular system"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FitOutcome {
    Fitted(MetricFit),
    Skipped(SkipReason),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FitEntry {
    pub metric: String,
    pub outcome: FitOutcome,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FitReport {
    pub window: Option<(f64, f64)>,
    pub order: FitOrder,
    pub entries: Vec<FitEntry>,
}

impl FitReport {
    pub fn get(&self, metric: &str) -> Option<&FitOutcome> {
        self.entries.iter().find(|e| e.metric == metric).map(|e| &e.outcome)
    }

    pub fn fitted(&self, metric: &str) -> Option<&MetricFit> {
        match self.get(metric)? {
            FitOutcome::Fitted(fit) => Some(fit),
            FitOutcome::Skipped(_) => None,
        }
    }
}

/// Weighted least-squares polynomial fit of `y` against `t`.
///
/// Non-finite samples and non-positive weights are ignored. Standard errors
/// come from the diagonal of `inv(XᵀWX) · σ²`, with `σ²` the weighted
/// residual variance; they are NaN when no degrees of freedom remain.
pub fn fit_polynomial(t: &[f64], y: &[f64], weights: &[f64], order: FitOrder) -> FitOutcome {
    let samples: Vec<(f64, f64, f64)> = t
        .iter()
        .zip(y)
        .zip(weights)
        .filter(|&((t, y), w)| t.is_finite() && y.is_finite() && *w > 0.0)
        .map(|((&t, &y), &w)| (t, y, w))
        .collect();

    let n = samples.len();
    if n <= MIN_FIT_SAMPLES {
        return FitOutcome::Skipped(SkipReason::InsufficientData { samples: n });
    }

    let p = order.degree() + 1;
    let mut distinct: Vec<f64> = samples.iter().map(|s| s.0).collect();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    if distinct.len() < p {
        return FitOutcome::Skipped(SkipReason::Singular);
    }

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut yv = DVector::<f64>::zeros(n);
    let mut w = DVector::<f64>::zeros(n);
    for (i, &(ti, yi, wi)) in samples.iter().enumerate() {
        let mut power = 1.0;
        for j in 0..p {
            x[(i, j)] = power;
            power *= ti;
        }
        yv[i] = yi;
        w[i] = wi;
    }

    // XᵀW
    let mut xtw = x.transpose();
    for (i, &wi) in w.iter().enumerate() {
        xtw.column_mut(i).scale_mut(wi);
    }
    let normal = &xtw * &x;
    let Some(normal_inv) = normal.try_inverse() else {
        return FitOutcome::Skipped(SkipReason::Singular);
    };
    let beta = &normal_inv * (&xtw * &yv);

    let residuals = &yv - &x * &beta;
    let weighted_sse: f64 = residuals
        .iter()
        .zip(w.iter())
        .map(|(r, wi)| wi * r * r)
        .sum();
    let dof = n - p;
    let sigma2 = if dof > 0 { weighted_sse / dof as f64 } else { f64::NAN };

    let std_errors = (0..p)
        .map(|j| {
            let variance = normal_inv[(j, j)] * sigma2;
            // f64::max would turn NaN into 0.
            if variance.is_nan() {
                f64::NAN
            } else {
                variance.max(0.0).sqrt()
            }
        })
        .collect();

    FitOutcome::Fitted(MetricFit {
        coefficients: beta.iter().copied().collect(),
        std_errors,
        samples: n,
    })
}

/// Fit every channel of `series` over inlier samples inside the window.
pub fn fit_series(series: &TimeSeries, config: &FitConfig) -> FitReport {
    let selected: Vec<usize> = (0..series.len())
        .filter(|&i| series.inlier[i])
        .filter(|&i| match config.window {
            Some((t0, t1)) => series.time[i] >= t0 && series.time[i] < t1,
            None => true,
        })
        .collect();
    debug!(samples = selected.len(), window = ?config.window, "Selected fit samples");

    let t: Vec<f64> = selected.iter().map(|&i| series.time[i]).collect();
    let weights = vec![1.0; t.len()];

    let mut channels: Vec<(String, &[f64])> = series
        .physical
        .iter()
        .map(|c| (c.name.clone(), c.values.as_slice()))
        .collect();
    if config.include_pixel {
        channels.extend(
            series
                .pixel
                .iter()
                .map(|c| (format!("{}_PX", c.name), c.values.as_slice())),
        );
    }

    let entries: Vec<FitEntry> = channels
        .into_iter()
        .map(|(metric, values)| {
            let y: Vec<f64> = selected.iter().map(|&i| values[i]).collect();
            FitEntry {
                metric,
                outcome: fit_polynomial(&t, &y, &weights, config.order),
            }
        })
        .collect();

    let fitted = entries
        .iter()
        .filter(|e| matches!(e.outcome, FitOutcome::Fitted(_)))
        .count();
    info!(
        fitted,
        skipped = entries.len() - fitted,
        order = config.order.degree(),
        "Fitted channels"
    );

    FitReport {
        window: config.window,
        order: config.order,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn quadratic_recovers_coefficients() {
        let t: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = t.iter().map(|t| 3.0 - 0.5 * t + 0.25 * t * t).collect();
        let FitOutcome::Fitted(fit) = fit_polynomial(&t, &y, &vec![1.0; t.len()], FitOrder::Quadratic) else {
            panic!("expected a fit");
        };
        assert_abs_diff_eq!(fit.coefficients[0], 3.0, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.coefficients[1], -0.5, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.coefficients[2], 0.25, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.eval(2.0), 3.0, epsilon = 1e-8);
    }

    #[test]
    fn two_points_are_insufficient() {
        let outcome = fit_polynomial(&[0.0, 1.0], &[1.0, 2.0], &[1.0, 1.0], FitOrder::Linear);
        assert_eq!(
            outcome,
            FitOutcome::Skipped(SkipReason::InsufficientData { samples: 2 })
        );
    }

    #[test]
    fn nan_samples_do_not_count() {
        let outcome = fit_polynomial(
            &[0.0, 1.0, 2.0, 3.0],
            &[1.0, f64::NAN, 5.0, f64::NAN],
            &[1.0; 4],
            FitOrder::Linear,
        );
        assert!(matches!(
            outcome,
            FitOutcome::Skipped(SkipReason::InsufficientData { samples: 2 })
        ));
    }

    #[test]
    fn quadratic_on_two_times_is_singular() {
        let outcome = fit_polynomial(
            &[0.0, 0.0, 1.0, 1.0],
            &[1.0, 1.1, 2.0, 2.1],
            &[1.0; 4],
            FitOrder::Quadratic,
        );
        assert_eq!(outcome, FitOutcome::Skipped(SkipReason::Singular));
    }

    #[test]
    fn noisy_line_has_nonzero_errors() {
        let t = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.1, 0.9, 2.1, 2.9, 4.1];
        let FitOutcome::Fitted(fit) = fit_polynomial(&t, &y, &[1.0; 5], FitOrder::Linear) else {
            panic!("expected a fit");
        };
        assert!(fit.std_errors.iter().all(|&e| e > 0.0 && e < 0.2));
    }
}
