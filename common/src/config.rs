use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_video_path")]
    pub video_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecoderConfig {
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
    #[serde(default = "default_ffprobe_bin")]
    pub ffprobe_bin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_plot_path")]
    pub plot_path: PathBuf,
    #[serde(default = "default_plot_width")]
    pub plot_width: u32,
    #[serde(default = "default_plot_height")]
    pub plot_height: u32,
    /// JSON dump of the series. Skipped when unset.
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_preview_dir")]
    pub dir: PathBuf,
    /// Write a snapshot every N processed frames.
    #[serde(default = "default_every_n")]
    pub every_n: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            video_path: default_video_path(),
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: default_ffmpeg_bin(),
            ffprobe_bin: default_ffprobe_bin(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot_path: default_plot_path(),
            plot_width: default_plot_width(),
            plot_height: default_plot_height(),
            report_path: None,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_preview_dir(),
            every_n: default_every_n(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        Self::parse(&content)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

// Default value functions
fn default_video_path() -> PathBuf {
    PathBuf::from("demo2_images/liquidVideo.mp4")
}
fn default_ffmpeg_bin() -> String {
    "ffmpeg".into()
}
fn default_ffprobe_bin() -> String {
    "ffprobe".into()
}
fn default_plot_path() -> PathBuf {
    PathBuf::from("liquid_level.svg")
}
fn default_plot_width() -> u32 {
    1024
}
fn default_plot_height() -> u32 {
    768
}
fn default_preview_dir() -> PathBuf {
    PathBuf::from("preview")
}
fn default_every_n() -> u64 {
    1
}
fn default_log_level() -> String {
    "info".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.decoder.ffmpeg_bin, "ffmpeg");
        assert_eq!(config.output.plot_path, PathBuf::from("liquid_level.svg"));
        assert!(config.output.report_path.is_none());
        assert!(!config.preview.enabled);
        assert_eq!(config.preview.every_n, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse(
            r#"
            [input]
            video_path = "clips/tank.mp4"

            [output]
            plot_path = "out/level.svg"
            report_path = "out/level.json"

            [preview]
            enabled = true
            every_n = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.input.video_path, PathBuf::from("clips/tank.mp4"));
        assert_eq!(config.output.plot_width, 1024);
        assert_eq!(
            config.output.report_path,
            Some(PathBuf::from("out/level.json"))
        );
        assert!(config.preview.enabled);
        assert_eq!(config.preview.every_n, 10);
        assert_eq!(config.preview.dir, PathBuf::from("preview"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = Config::parse("[output\nplot_path = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("liquid-level-no-such-config.toml");
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.decoder.ffprobe_bin, "ffprobe");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::ReadFile(_, _))
        ));
    }
}
