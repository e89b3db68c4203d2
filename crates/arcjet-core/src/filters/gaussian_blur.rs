use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Apply Gaussian blur to a float array using separable 1D convolution.
/// Borders replicate the edge pixel.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma <= 0.0 {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve(data, &kernel, Axis(1));
    convolve(&row_pass, &kernel, Axis(0))
}

/// Blur an 8-bit grayscale image, rounding back to `u8`.
pub fn blur_gray(data: &Array2<u8>, sigma: f32) -> Array2<u8> {
    let blurred = gaussian_blur_array(&data.mapv(|v| v as f32), sigma);
    blurred.mapv(to_u8)
}

/// Blur each channel of an 8-bit color image independently.
pub fn blur_color(data: &Array3<u8>, sigma: f32) -> Array3<u8> {
    let mut out = Array3::<u8>::zeros(data.raw_dim());
    for (src, mut dst) in data
        .axis_iter(Axis(2))
        .zip(out.axis_iter_mut(Axis(2)))
    {
        let channel = gaussian_blur_array(&src.mapv(|v| v as f32), sigma);
        dst.assign(&channel.mapv(to_u8));
    }
    out
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Convolve along `axis` (Axis(1) = along rows, Axis(0) = along columns).
fn convolve(data: &Array2<f32>, kernel: &[f32], axis: Axis) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() as isize / 2;

    let sample = |row: usize, col: usize| -> f32 {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let delta = ki as isize - radius;
            let v = if axis == Axis(1) {
                let c = (col as isize + delta).clamp(0, w as isize - 1) as usize;
                data[[row, c]]
            } else {
                let r = (row as isize + delta).clamp(0, h as isize - 1) as usize;
                data[[r, col]]
            };
            sum += v * kv;
        }
        sum
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| (0..w).map(|col| sample(row, col)).collect())
            .collect();

        let mut result = Array2::<f32>::zeros((h, w));
        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
        result
    } else {
        Array2::from_shape_fn((h, w), |(row, col)| sample(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized() {
        let k = make_gaussian_kernel(1.1);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(k.len() % 2, 1);
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let data = Array2::from_elem((8, 8), 77u8);
        let out = blur_gray(&data, 1.5);
        assert!(out.iter().all(|&v| v == 77));
    }
}
