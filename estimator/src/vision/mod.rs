pub mod contours;
pub mod difference;
pub mod threshold;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("frame is {got:?} but background is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        got: (u32, u32),
    },
}
