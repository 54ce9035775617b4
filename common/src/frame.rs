use image::RgbImage;

/// One decoded video frame.
///
/// Pixels are packed RGB24, row-major, `width * height * 3` bytes. `index` is
/// the 0-based position of the frame in the decoded stream (the background
/// frame is index 0).
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(index: u64, image: RgbImage) -> Self {
        Self { index, image }
    }

    /// Build a frame from a raw rgb24 buffer as produced by
    /// `ffmpeg -f rawvideo -pix_fmt rgb24`.
    pub fn from_rgb24(index: u64, width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = Self::byte_len(width, height);
        if data.len() < expected {
            return Err(FrameError::TooShort {
                got: data.len(),
                expected,
            });
        }
        let got = data.len();
        let image = RgbImage::from_raw(width, height, data)
            .ok_or(FrameError::Dimensions { width, height, got })?;
        Ok(Self { index, image })
    }

    /// Size in bytes of one rgb24 frame at the given resolution.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame buffer too short: got {got} bytes, expected at least {expected}")]
    TooShort { got: usize, expected: usize },
    #[error("frame buffer of {got} bytes does not fit {width}x{height} rgb24")]
    Dimensions { width: u32, height: u32, got: usize },
}
