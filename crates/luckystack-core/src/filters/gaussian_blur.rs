use ndarray::{Array3, ArrayViewMut2, Axis};
use rayon::prelude::*;

use crate::consts::{MIN_KERNEL_SIZE, PARALLEL_PIXEL_THRESHOLD};

#[derive(Clone, Copy)]
enum Direction {
    Horizontal,
    Vertical,
}

/// Raise a kernel size to the next odd value of at least 3.
pub fn normalize_kernel_size(size: usize) -> usize {
    let size = size.max(MIN_KERNEL_SIZE);
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Normalized 1D Gaussian weights of `kernel_size` taps (after normalization).
///
/// A non-positive sigma is derived from the kernel size as
/// `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(kernel_size: usize, sigma: f64) -> Vec<f64> {
    let size = normalize_kernel_size(kernel_size);
    let radius = size / 2;
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size - 1) as f64 * 0.5 - 1.0) + 0.8
    };
    let s2 = 2.0 * sigma * sigma;

    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / s2).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur of each channel of an (h, w, c) image.
/// Borders replicate the edge pixel.
pub fn gaussian_blur(data: &Array3<f64>, kernel_size: usize, sigma: f64) -> Array3<f64> {
    let kernel = gaussian_kernel(kernel_size, sigma);
    let row_pass = convolve(data, &kernel, Direction::Horizontal);
    convolve(&row_pass, &kernel, Direction::Vertical)
}

fn convolve(data: &Array3<f64>, kernel: &[f64], direction: Direction) -> Array3<f64> {
    let (h, w, channels) = data.dim();
    let radius = (kernel.len() / 2) as isize;
    let mut result = Array3::<f64>::zeros((h, w, channels));

    let fill_row = |row: usize, mut out: ArrayViewMut2<f64>| {
        for col in 0..w {
            for ch in 0..channels {
                let mut sum = 0.0;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let offset = ki as isize - radius;
                    let (src_row, src_col) = match direction {
                        Direction::Horizontal => (row, clamp_index(col, offset, w)),
                        Direction::Vertical => (clamp_index(row, offset, h), col),
                    };
                    sum += data[[src_row, src_col, ch]] * kv;
                }
                out[[col, ch]] = sum;
            }
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out)| fill_row(row, out));
    } else {
        for (row, out) in result.axis_iter_mut(Axis(0)).enumerate() {
            fill_row(row, out);
        }
    }
    result
}

fn clamp_index(index: usize, offset: isize, len: usize) -> usize {
    (index as isize + offset).clamp(0, len as isize - 1) as usize
}
