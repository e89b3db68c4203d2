//! Local outlier factor over small dense feature sets.

use rayon::prelude::*;

use crate::consts::{LOF_EPSILON, PARALLEL_FRAME_THRESHOLD};

/// Neighbourhood of one sample: neighbour indices (nearest first) and the
/// distance to each.
struct Neighborhood {
    indices: Vec<usize>,
    distances: Vec<f64>,
}

impl Neighborhood {
    fn k_distance(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

fn neighborhood(points: &[Vec<f64>], i: usize, k: usize) -> Neighborhood {
    let mut others: Vec<(f64, usize)> = points
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(j, p)| (euclidean(&points[i], p), j))
        .collect();
    others.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    others.truncate(k);
    Neighborhood {
        indices: others.iter().map(|&(_, j)| j).collect(),
        distances: others.iter().map(|&(d, _)| d).collect(),
    }
}

/// LOF score of every point using its `k` nearest neighbours.
///
/// Scores near 1 mean the point is as dense as its neighbours; larger scores
/// mean it sits in a sparser region. `k` is capped at `n - 1`. With fewer
/// than two points every score is 1.
pub fn local_outlier_factor(points: &[Vec<f64>], k: usize) -> Vec<f64> {
    let n = points.len();
    let k = k.min(n.saturating_sub(1));
    if k == 0 {
        return vec![1.0; n];
    }

    let hoods: Vec<Neighborhood> = if n >= PARALLEL_FRAME_THRESHOLD {
        (0..n).into_par_iter().map(|i| neighborhood(points, i, k)).collect()
    } else {
        (0..n).map(|i| neighborhood(points, i, k)).collect()
    };

    let lrd: Vec<f64> = hoods
        .iter()
        .map(|h| {
            let reach: f64 = h
                .indices
                .iter()
                .zip(&h.distances)
                .map(|(&o, &d)| d.max(hoods[o].k_distance()))
                .sum::<f64>()
                / k as f64;
            1.0 / (reach + LOF_EPSILON)
        })
        .collect();

    hoods
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let mean_neighbor: f64 = h.indices.iter().map(|&o| lrd[o]).sum::<f64>() / k as f64;
            mean_neighbor / lrd[i]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_cluster_scores_one() {
        let points: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 0.0]).collect();
        let scores = local_outlier_factor(&points, 3);
        for s in &scores[2..8] {
            assert!((s - 1.0).abs() < 0.2, "{s}");
        }
    }

    #[test]
    fn isolated_point_scores_high() {
        let mut points: Vec<Vec<f64>> = (0..12)
            .map(|i| vec![(i % 4) as f64 * 0.1, (i / 4) as f64 * 0.1])
            .collect();
        points.push(vec![50.0, 50.0]);
        let scores = local_outlier_factor(&points, 5);
        assert!(scores[12] > 10.0);
        assert!(scores[..12].iter().all(|&s| s < 1.5));
    }

    #[test]
    fn single_point_is_inlier() {
        assert_eq!(local_outlier_factor(&[vec![1.0]], 11), vec![1.0]);
    }
}
