use image::GrayImage;
use imageproc::contrast::otsu_level;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Binary mask plus the Otsu level it was cut at.
pub struct Binarized {
    pub mask: GrayImage,
    pub level: u8,
}

impl Binarized {
    pub fn foreground_pixels(&self) -> usize {
        self.mask.pixels().filter(|p| p.0[0] == FOREGROUND).count()
    }
}

/// Global Otsu threshold.
///
/// The level is the top of the lower intensity class; pixels above it are
/// foreground. A uniform image yields level 0, so an all-zero difference
/// produces an empty mask.
pub fn otsu_binarize(gray: &GrayImage) -> Binarized {
    let level = otsu_level(gray);
    let mut mask = gray.clone();
    for p in mask.pixels_mut() {
        p.0[0] = if p.0[0] > level { FOREGROUND } else { BACKGROUND };
    }
    Binarized { mask, level }
}
