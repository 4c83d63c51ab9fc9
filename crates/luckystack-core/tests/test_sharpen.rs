use approx::assert_abs_diff_eq;
use ndarray::Array3;

use luckystack_core::filters::gaussian_blur::{gaussian_blur, gaussian_kernel, normalize_kernel_size};
use luckystack_core::filters::unsharp_mask::saturate_u8;
use luckystack_core::filters::{sharpen_frame, unsharp_mask, UnsharpParams};
use luckystack_core::frame::Frame;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn params(kernel_size: usize, sigma: f64) -> UnsharpParams {
    UnsharpParams {
        kernel_size,
        sigma,
        amount: None,
    }
}

fn ramp(h: usize, w: usize) -> Array3<f64> {
    Array3::from_shape_fn((h, w, 3), |(r, c, ch)| (r * 17 + c * 5 + ch * 3) as f64 * 0.9)
}

fn checkerboard(h: usize, w: usize) -> Array3<f64> {
    Array3::from_shape_fn((h, w, 3), |(r, c, _)| if (r + c) % 2 == 0 { 255.0 } else { 0.0 })
}

/// 3x3 image, black except for one centre pixel.
fn spike(value: f64) -> Array3<f64> {
    let mut data = Array3::<f64>::zeros((3, 3, 3));
    for ch in 0..3 {
        data[[1, 1, ch]] = value;
    }
    data
}

// ---------------------------------------------------------------------------
// Kernel
// ---------------------------------------------------------------------------

#[test]
fn test_kernel_size_normalized_to_odd() {
    assert_eq!(normalize_kernel_size(0), 3);
    assert_eq!(normalize_kernel_size(1), 3);
    assert_eq!(normalize_kernel_size(2), 3);
    assert_eq!(normalize_kernel_size(3), 3);
    assert_eq!(normalize_kernel_size(4), 5);
    assert_eq!(normalize_kernel_size(5), 5);
    assert_eq!(normalize_kernel_size(10), 11);
}

#[test]
fn test_gaussian_kernel_normalized_and_symmetric() {
    let kernel = gaussian_kernel(7, 1.5);
    assert_eq!(kernel.len(), 7);
    assert_abs_diff_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    for i in 0..3 {
        assert_abs_diff_eq!(kernel[i], kernel[6 - i], epsilon = 1e-15);
        assert!(kernel[i] < kernel[i + 1]);
    }
}

#[test]
fn test_zero_sigma_kernel_derived_from_size() {
    // size 3 -> sigma 0.8
    let kernel = gaussian_kernel(3, 0.0);
    let edge = (-1.0f64 / (2.0 * 0.8 * 0.8)).exp();
    let sum = 1.0 + 2.0 * edge;
    assert_abs_diff_eq!(kernel[1], 1.0 / sum, epsilon = 1e-12);
    assert_abs_diff_eq!(kernel[0], edge / sum, epsilon = 1e-12);
}

#[test]
fn test_blur_preserves_constant_image() {
    let data = Array3::from_elem((6, 5, 3), 42.0);
    let blurred = gaussian_blur(&data, 5, 2.0);
    for &v in blurred.iter() {
        assert_abs_diff_eq!(v, 42.0, epsilon = 1e-9);
    }
}

#[test]
fn test_blur_does_not_mix_channels() {
    let mut data = Array3::<f64>::zeros((4, 4, 3));
    data.index_axis_mut(ndarray::Axis(2), 1).fill(100.0);
    let blurred = gaussian_blur(&data, 3, 1.0);
    for r in 0..4 {
        for c in 0..4 {
            assert_abs_diff_eq!(blurred[[r, c, 0]], 0.0);
            assert_abs_diff_eq!(blurred[[r, c, 1]], 100.0, epsilon = 1e-9);
            assert_abs_diff_eq!(blurred[[r, c, 2]], 0.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Unsharp mask
// ---------------------------------------------------------------------------

#[test]
fn test_even_kernel_matches_next_odd() {
    let image = ramp(9, 11);
    let even = unsharp_mask(&image, &params(4, 30.0));
    let odd = unsharp_mask(&image, &params(5, 30.0));
    assert_eq!(even.data, odd.data);
}

#[test]
fn test_strength_coupled_to_sigma_by_default() {
    assert_abs_diff_eq!(params(5, 25.0).strength(), 0.5);
    assert_abs_diff_eq!(params(5, 0.0).strength(), 0.0);
    let explicit = UnsharpParams {
        amount: Some(1.5),
        ..params(5, 25.0)
    };
    assert_abs_diff_eq!(explicit.strength(), 1.5);
}

#[test]
fn test_centre_pixel_follows_formula() {
    let image = spike(100.0);
    let p = params(3, 1.0);
    let out = unsharp_mask(&image, &p);

    let k = gaussian_kernel(3, 1.0);
    let blurred_centre = k[1] * k[1] * 100.0;
    let expected = 100.0 + 2.0 * (1.0 / 100.0) * (100.0 - blurred_centre);
    assert_eq!(out.data[[1, 1, 0]], saturate_u8(expected));
}

#[test]
fn test_negative_overshoot_clamped_to_zero() {
    let out = unsharp_mask(&spike(200.0), &params(3, 100.0));
    // Neighbours of the spike undershoot below black
    assert_eq!(out.data[[0, 1, 0]], 0);
    assert_eq!(out.data[[1, 0, 2]], 0);
    assert_eq!(out.data[[1, 1, 1]], 255);
}

#[test]
fn test_output_stays_in_range_for_any_sigma() {
    let image = checkerboard(8, 8);
    for sigma in [0.0, 0.5, 3.0, 25.0, 100.0, 500.0] {
        let out = unsharp_mask(&image, &params(5, sigma));
        assert_eq!(out.data.dim(), image.dim());
        for (&src, &dst) in image.iter().zip(out.data.iter()) {
            // Extremes can only be pushed further out, which saturates
            if src == 0.0 {
                assert_eq!(dst, 0, "sigma {sigma}");
            } else {
                assert_eq!(dst, 255, "sigma {sigma}");
            }
        }
    }
}

#[test]
fn test_zero_sigma_is_identity_after_rounding() {
    let image = ramp(5, 7);
    let out = unsharp_mask(&image, &params(1, 0.0));
    for (&src, &dst) in image.iter().zip(out.data.iter()) {
        assert_eq!(dst, saturate_u8(src));
    }
}

#[test]
fn test_zero_amount_overrides_sigma() {
    let image = ramp(5, 7);
    let p = UnsharpParams {
        amount: Some(0.0),
        ..params(7, 80.0)
    };
    let out = unsharp_mask(&image, &p);
    for (&src, &dst) in image.iter().zip(out.data.iter()) {
        assert_eq!(dst, saturate_u8(src));
    }
}

#[test]
fn test_constant_image_unchanged_on_parallel_path() {
    let image = Array3::from_elem((300, 256, 3), 120.0);
    let out = unsharp_mask(&image, &params(9, 40.0));
    assert_eq!(out.geometry(), (300, 256));
    assert!(out.data.iter().all(|&v| v == 120));
}

#[test]
fn test_sharpen_frame_accepts_8bit_input() {
    let frame = Frame::filled(4, 6, 33);
    let out = sharpen_frame(&frame, &params(3, 10.0));
    assert_eq!(out.geometry(), (4, 6));
    assert!(out.data.iter().all(|&v| v == 33));
}

#[test]
fn test_saturate_rounds_and_caps() {
    assert_eq!(saturate_u8(45.0), 45);
    assert_eq!(saturate_u8(44.5), 45);
    assert_eq!(saturate_u8(44.49), 44);
    assert_eq!(saturate_u8(300.0), 255);
    assert_eq!(saturate_u8(0.0), 0);
}
