use liquid_level_common::frame::Frame;
use liquid_level_common::source::SourceError;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Splits a raw rgb24 byte stream into fixed-size frames.
///
/// Every frame is exactly `width * height * 3` bytes. EOF on a frame boundary
/// ends the stream; EOF inside a frame is reported as [`SourceError::Truncated`].
pub struct RawFrameReader<R> {
    reader: R,
    width: u32,
    height: u32,
    next_index: u64,
}

impl<R: AsyncRead + Unpin> RawFrameReader<R> {
    pub fn new(reader: R, width: u32, height: u32) -> Self {
        Self {
            reader,
            width,
            height,
            next_index: 0,
        }
    }

    /// Number of complete frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.next_index
    }

    pub async fn read_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let index = self.next_index;
        let frame_len = Frame::byte_len(self.width, self.height);
        let mut buf = vec![0u8; frame_len];
        let mut filled = 0;

        while filled < frame_len {
            let n = self
                .reader
                .read(&mut buf[filled..])
                .await
                .map_err(|e| SourceError::Read {
                    index,
                    reason: e.to_string(),
                })?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            debug!(frames = index, "raw stream ended");
            return Ok(None);
        }
        if filled < frame_len {
            return Err(SourceError::Truncated {
                index,
                got: filled,
                expected: frame_len,
            });
        }

        let frame = Frame::from_rgb24(index, self.width, self.height, buf)?;
        self.next_index += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn reads_whole_frames_then_ends() {
        // two 2x1 frames
        let bytes: Vec<u8> = (0..12).collect();
        let mut reader = RawFrameReader::new(Cursor::new(bytes), 2, 1);

        let first = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.image.get_pixel(0, 0).0, [0, 1, 2]);

        let second = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.image.get_pixel(1, 0).0, [9, 10, 11]);

        assert!(reader.read_frame().await.unwrap().is_none());
        assert_eq!(reader.frames_read(), 2);
    }

    #[tokio::test]
    async fn empty_stream_has_no_frames() {
        let mut reader = RawFrameReader::new(Cursor::new(Vec::<u8>::new()), 4, 4);
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn trailing_partial_frame_is_error() {
        let mut reader = RawFrameReader::new(Cursor::new(vec![7u8; 6 + 4]), 2, 1);
        assert!(reader.read_frame().await.unwrap().is_some());
        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Truncated {
                index: 1,
                got: 4,
                expected: 6
            }
        ));
    }
}
