//! Leading-edge extraction and radial interpolation.
//!
//! For horizontal flow the "perpendicular" axis is y and positions are
//! reported along x; for vertical flow the roles swap. Field names keep the
//! horizontal-flow spelling (`YCENTER`, `INTERP_XPOS`) in both cases.

use serde::{Deserialize, Serialize};

use crate::error::ArcjetError;
use crate::geometry::{Contour, Point};

/// Direction the flow travels across the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Left,
    Right,
    Up,
    Down,
}

impl FlowDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// +1 when positions grow downstream, -1 otherwise.
    pub fn downstream_sign(self) -> f64 {
        match self {
            Self::Right | Self::Down => 1.0,
            Self::Left | Self::Up => -1.0,
        }
    }

    fn perpendicular(self, p: Point) -> i32 {
        if self.is_horizontal() {
            p.y
        } else {
            p.x
        }
    }

    fn along(self, p: Point) -> i32 {
        if self.is_horizontal() {
            p.x
        } else {
            p.y
        }
    }
}

impl std::fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for FlowDirection {
    type Err = ArcjetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(ArcjetError::InvalidConfig(format!(
                "unknown flow direction '{other}'"
            ))),
        }
    }
}

/// Open, upstream-facing arc of a contour in frame-global coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Edge {
    pub points: Vec<Point>,
}

impl Edge {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Select the arc of `contour` facing into `flow` and shift it by `offset` `(x, y)`.
///
/// The contour is split at its first minimum and first maximum along the
/// perpendicular axis. Flow to the right or upward keeps the arc walked
/// forward from minimum to maximum; flow to the left or downward keeps the
/// wrap-around complement.
pub fn extract_edge(contour: &Contour, flow: FlowDirection, offset: (i32, i32)) -> Edge {
    let points = &contour.points;
    if points.is_empty() {
        return Edge::default();
    }

    let key = |p: &Point| flow.perpendicular(*p);
    let imin = first_extreme(points, key, |a, b| a < b);
    let imax = first_extreme(points, key, |a, b| a > b);

    let arc = match flow {
        FlowDirection::Right | FlowDirection::Up => cyclic_arc(points, imin, imax),
        FlowDirection::Left | FlowDirection::Down => cyclic_arc(points, imax, imin),
    };

    Edge {
        points: arc
            .into_iter()
            .map(|p| p.offset(offset.0, offset.1))
            .collect(),
    }
}

fn first_extreme(points: &[Point], key: impl Fn(&Point) -> i32, better: impl Fn(i32, i32) -> bool) -> usize {
    let mut best = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        if better(key(p), key(&points[best])) {
            best = i;
        }
    }
    best
}

/// Points from `from` forward to `to` inclusive, wrapping past the end.
fn cyclic_arc(points: &[Point], from: usize, to: usize) -> Vec<Point> {
    let n = points.len();
    let len = (to + n - from) % n + 1;
    (0..len).map(|k| points[(from + k) % n]).collect()
}

/// Scalar geometry of one leading edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetrics {
    /// Relative radii the positions were sampled at.
    pub relative_radii: Vec<f64>,
    /// Midpoint of the edge's perpendicular extent.
    pub center: f64,
    /// Smallest perpendicular coordinate.
    pub low: f64,
    /// Largest perpendicular coordinate.
    pub high: f64,
    /// Half the perpendicular extent.
    pub radius: f64,
    /// Along-flow position at each relative radius, 0 where nothing matched.
    pub positions: Vec<f64>,
}

impl EdgeMetrics {
    /// Position at relative radius 0, if it was sampled.
    pub fn stagnation_position(&self) -> Option<f64> {
        self.position_at(0.0)
    }

    pub fn position_at(&self, relative_radius: f64) -> Option<f64> {
        self.relative_radii
            .iter()
            .position(|&r| (r - relative_radius).abs() < 1e-9)
            .and_then(|i| self.positions.get(i).copied())
    }

    /// Like [`position_at`](Self::position_at), but an unmatched target
    /// (stored as 0) is `None`.
    pub fn matched_position_at(&self, relative_radius: f64) -> Option<f64> {
        self.position_at(relative_radius).filter(|&x| x != 0.0)
    }
}

/// Sample the edge at `center + r * radius` for each relative radius `r`.
///
/// Each target takes the along-flow coordinate of the edge point whose
/// perpendicular coordinate is closest to it, provided that point lies
/// within `tolerance`. Sparse edges can leave targets unmatched (reported as 0).
/// Returns `None` for an empty edge.
pub fn interpolate(
    edge: &Edge,
    flow: FlowDirection,
    relative_radii: &[f64],
    tolerance: f64,
) -> Option<EdgeMetrics> {
    if edge.is_empty() {
        return None;
    }

    let perp: Vec<f64> = edge.points.iter().map(|&p| flow.perpendicular(p) as f64).collect();
    let along: Vec<f64> = edge.points.iter().map(|&p| flow.along(p) as f64).collect();

    let low = perp.iter().copied().fold(f64::INFINITY, f64::min);
    let high = perp.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let center = (low + high) / 2.0;
    let radius = (high - low) / 2.0;

    let positions = relative_radii
        .iter()
        .map(|&r| {
            let target = center + r * radius;
            let mut best: Option<(f64, usize)> = None;
            for (i, &v) in perp.iter().enumerate() {
                let d = (v - target).abs();
                if d <= tolerance && best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, i));
                }
            }
            best.map_or(0.0, |(_, i)| along[i])
        })
        .collect();

    Some(EdgeMetrics {
        relative_radii: relative_radii.to_vec(),
        center,
        low,
        high,
        radius,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pixel-perimeter contour of a filled block, traced the way border
    /// following produces it: down the left side first.
    fn block(x0: i32, y0: i32, x1: i32, y1: i32) -> Contour {
        let mut pts = Vec::new();
        for y in y0..=y1 {
            pts.push(Point::new(x0, y));
        }
        for x in x0 + 1..=x1 {
            pts.push(Point::new(x, y1));
        }
        for y in (y0..y1).rev() {
            pts.push(Point::new(x1, y));
        }
        for x in (x0 + 1..x1).rev() {
            pts.push(Point::new(x, y0));
        }
        Contour::new(pts)
    }

    #[test]
    fn rightward_flow_keeps_left_side() {
        let edge = extract_edge(&block(10, 5, 20, 15), FlowDirection::Right, (0, 0));
        assert!(edge.points.iter().all(|p| p.x == 10));
        assert_eq!(edge.points.len(), 11);
    }

    #[test]
    fn leftward_flow_keeps_right_side() {
        let edge = extract_edge(&block(10, 5, 20, 15), FlowDirection::Left, (0, 0));
        assert_eq!(edge.points.first(), Some(&Point::new(10, 15)));
        assert!(edge.points.iter().any(|p| p.x == 20));
        assert!(edge.points.iter().filter(|p| p.x == 20).count() == 11);
    }

    #[test]
    fn offset_restores_frame_coordinates() {
        let edge = extract_edge(&block(0, 0, 4, 4), FlowDirection::Right, (100, 50));
        assert_eq!(edge.points[0], Point::new(100, 50));
    }

    #[test]
    fn vertical_flow_uses_x_extremes() {
        let down = extract_edge(&block(0, 0, 6, 6), FlowDirection::Down, (0, 0));
        assert!(down.points.iter().any(|p| p.y == 0 && p.x == 3));
        let up = extract_edge(&block(0, 0, 6, 6), FlowDirection::Up, (0, 0));
        assert!(up.points.iter().any(|p| p.y == 6 && p.x == 3));
    }

    #[test]
    fn unmatched_target_reports_zero() {
        let edge = Edge {
            points: vec![Point::new(5, 0), Point::new(5, 20)],
        };
        let m = interpolate(&edge, FlowDirection::Right, &[0.0], 3.0).unwrap();
        assert_eq!(m.center, 10.0);
        assert_eq!(m.positions, vec![0.0]);
        assert_eq!(m.position_at(0.0), Some(0.0));
        assert_eq!(m.matched_position_at(0.0), None);
    }

    #[test]
    fn short_position_list_does_not_panic() {
        let m = EdgeMetrics {
            relative_radii: vec![-0.5, 0.0, 0.5],
            center: 10.0,
            low: 0.0,
            high: 20.0,
            radius: 10.0,
            positions: vec![4.0],
        };
        assert_eq!(m.position_at(-0.5), Some(4.0));
        assert_eq!(m.position_at(0.5), None);
    }

    #[test]
    fn empty_edge_has_no_metrics() {
        assert!(interpolate(&Edge::default(), FlowDirection::Right, &[0.0], 3.0).is_none());
    }
}
