use image::{GrayImage, Luma, RgbImage};

use super::VisionError;

// BT.601 luma weights in 14-bit fixed point (sum = 1 << 14).
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Channel-wise `background - frame`, clamped at zero.
///
/// Not an absolute difference: only pixels darker than the background register.
pub fn subtract_saturating(background: &RgbImage, frame: &RgbImage) -> Result<RgbImage, VisionError> {
    if background.dimensions() != frame.dimensions() {
        return Err(VisionError::DimensionMismatch {
            expected: background.dimensions(),
            got: frame.dimensions(),
        });
    }

    let mut out = background.clone();
    for (dst, src) in out.pixels_mut().zip(frame.pixels()) {
        for (d, s) in dst.0.iter_mut().zip(src.0.iter()) {
            *d = d.saturating_sub(*s);
        }
    }
    Ok(out)
}

/// Rgb to single-channel intensity, `0.299 R + 0.587 G + 0.114 B` rounded.
///
/// Not `to_luma8`: that one uses Rec. 709 weights.
pub fn to_luma(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = (r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT
            + (1 << (LUMA_SHIFT - 1)))
            >> LUMA_SHIFT;
        Luma([luma as u8])
    })
}
