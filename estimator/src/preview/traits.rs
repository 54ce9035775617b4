use image::{GrayImage, RgbImage};

/// One of the intermediate images of a processed frame.
#[derive(Debug, Clone, Copy)]
pub enum PreviewView<'a> {
    /// The decoded frame.
    Video(&'a RgbImage),
    /// Background minus frame.
    Sub(&'a RgbImage),
    /// Binary mask after thresholding.
    SubThresh(&'a GrayImage),
}

impl PreviewView<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            PreviewView::Video(_) => "Video",
            PreviewView::Sub(_) => "Sub",
            PreviewView::SubThresh(_) => "Sub Thresh",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            PreviewView::Video(_) => "video",
            PreviewView::Sub(_) => "sub",
            PreviewView::SubThresh(_) => "sub_thresh",
        }
    }
}

/// Where live previews go.
///
/// Previews are informational only: the pipeline logs a failing `show` and
/// keeps going.
pub trait FrameSink {
    fn show(&mut self, frame_index: u64, view: PreviewView<'_>) -> Result<(), SinkError>;

    /// Called once when the run ends, on every exit path.
    fn close(&mut self) {}

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Headless sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl FrameSink for NoopSink {
    fn show(&mut self, _frame_index: u64, _view: PreviewView<'_>) -> Result<(), SinkError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to create preview directory {0}: {1}")]
    CreateDir(String, std::io::Error),
    #[error("failed to write preview {0}: {1}")]
    Write(String, image::ImageError),
}
