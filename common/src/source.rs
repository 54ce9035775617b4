use crate::frame::{Frame, FrameError};

/// A stream of decoded frames.
///
/// `next_frame` returns `Ok(None)` at end of stream; that is a normal
/// termination, not an error. `release` must be called once the consumer is
/// done, on every exit path, and is idempotent.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;

    async fn release(&mut self);

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to open video {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("failed to probe video {path}: {reason}")]
    Probe { path: String, reason: String },
    #[error("failed to read frame {index}: {reason}")]
    Read { index: u64, reason: String },
    #[error("stream ended mid-frame {index}: got {got} of {expected} bytes")]
    Truncated {
        index: u64,
        got: usize,
        expected: usize,
    },
    #[error("decoder exited with error: {0}")]
    Decoder(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}
