use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_KERNEL_SIZE, DEFAULT_SHARPEN_SIGMA, MAX_OUTPUT_VALUE, PARALLEL_PIXEL_THRESHOLD,
};
use crate::filters::gaussian_blur::gaussian_blur;
use crate::frame::{CoaddedImage, Frame};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsharpParams {
    /// Blur kernel width; even values are bumped to the next odd one.
    pub kernel_size: usize,
    /// Gaussian sigma of the blurred copy.
    pub sigma: f64,
    /// Sharpening strength. `None` ties it to the blur: `2 * sigma / 100`.
    pub amount: Option<f64>,
}

impl Default for UnsharpParams {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            sigma: DEFAULT_SHARPEN_SIGMA,
            amount: None,
        }
    }
}

impl UnsharpParams {
    pub fn strength(&self) -> f64 {
        self.amount.unwrap_or(2.0 * self.sigma / 100.0)
    }
}

/// Apply unsharp mask sharpening and narrow to 8 bits.
///
/// `out = orig + strength * (orig - blurred)`. Negative results are clamped
/// to zero; the upper bound is only enforced by the final saturation.
pub fn unsharp_mask(image: &Array3<f64>, params: &UnsharpParams) -> Frame {
    let blurred = gaussian_blur(image, params.kernel_size, params.sigma);
    let strength = params.strength();

    let sharpen = |&orig: &f64, &blur: &f64| {
        let value = (orig + strength * (orig - blur)).max(0.0);
        saturate_u8(value)
    };

    let (h, w, _) = image.dim();
    let zip = Zip::from(image).and(&blurred);
    let data = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_map_collect(sharpen)
    } else {
        zip.map_collect(sharpen)
    };

    Frame::new(data)
}

/// Sharpen a coadded image.
pub fn sharpen_coadd(image: &CoaddedImage, params: &UnsharpParams) -> Frame {
    unsharp_mask(&image.data, params)
}

/// Sharpen an 8-bit frame.
pub fn sharpen_frame(frame: &Frame, params: &UnsharpParams) -> Frame {
    unsharp_mask(&frame.data.mapv(f64::from), params)
}

/// Round and saturate a non-negative value into the 8-bit range.
pub fn saturate_u8(value: f64) -> u8 {
    value.round().clamp(0.0, MAX_OUTPUT_VALUE) as u8
}
