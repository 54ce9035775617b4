pub mod ffmpeg;
pub mod probe;
pub mod raw;

pub use ffmpeg::FfmpegSource;
