use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::consts::{MAX_OUTPUT_VALUE, U8_TO_U16_SCALE};
use crate::error::{LuckyError, Result};
use crate::frame::{CoaddedImage, Frame};

/// Save a BGR8 frame as an 8-bit RGB image; format follows the extension.
pub fn save_bgr8(frame: &Frame, path: &Path) -> Result<()> {
    let (h, w) = frame.geometry();
    let mut img = RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let b = frame.data[[row, col, 0]];
            let g = frame.data[[row, col, 1]];
            let r = frame.data[[row, col, 2]];
            img.put_pixel(col as u32, row as u32, Rgb([r, g, b]));
        }
    }
    img.save(path)?;
    Ok(())
}

/// Save an unsharpened coadd as 16-bit RGB TIFF.
pub fn save_coadd_tiff(image: &CoaddedImage, path: &Path) -> Result<()> {
    let (h, w) = (image.height(), image.width());

    let mut pixels: Vec<u16> = Vec::with_capacity(h * w * 3);
    for row in 0..h {
        for col in 0..w {
            for channel in [2, 1, 0] {
                let v = image.data[[row, col, channel]].clamp(0.0, MAX_OUTPUT_VALUE);
                pixels.push((v * U8_TO_U16_SCALE).round() as u16);
            }
        }
    }

    let img = ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or(LuckyError::InvalidDimensions { width: w, height: h })?;
    img.save(path)?;
    Ok(())
}
