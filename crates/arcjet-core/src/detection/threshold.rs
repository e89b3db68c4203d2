use ndarray::Array2;

/// Binary mask of pixels strictly brighter than `threshold`.
pub fn threshold_mask(data: &Array2<u8>, threshold: u8) -> Array2<bool> {
    data.mapv(|v| v > threshold)
}

/// Compute mean and standard deviation of pixel values.
pub fn compute_mean_stddev(data: &Array2<u8>) -> (f64, f64) {
    let n = data.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let sum: f64 = data.iter().map(|&v| v as f64).sum();
    let mean = sum / n;
    let var: f64 = data.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
