use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use liquid_level_common::source::SourceError;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Ask ffprobe for the resolution of the first video stream.
pub async fn probe_dimensions(ffprobe_bin: &str, path: &Path) -> Result<(u32, u32), SourceError> {
    let shown = path.display().to_string();

    if !path.exists() {
        return Err(SourceError::Open {
            path: shown,
            reason: "no such file".into(),
        });
    }

    let output = Command::new(ffprobe_bin)
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height",
            "-of", "json",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| SourceError::Open {
            path: shown.clone(),
            reason: format!("failed to spawn {ffprobe_bin}: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::Open {
            path: shown,
            reason: stderr.trim().to_string(),
        });
    }

    let dims = parse_probe_output(&output.stdout).map_err(|reason| SourceError::Probe {
        path: shown.clone(),
        reason,
    })?;
    debug!(path = shown, width = dims.0, height = dims.1, "probed video");
    Ok(dims)
}

/// Parse the JSON printed by `ffprobe -show_entries stream=width,height -of json`.
pub fn parse_probe_output(stdout: &[u8]) -> Result<(u32, u32), String> {
    let probe: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| e.to_string())?;
    let stream = probe
        .streams
        .first()
        .ok_or_else(|| "no video stream".to_string())?;
    match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        (w, h) => Err(format!("invalid video dimensions {w:?}x{h:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dimensions() {
        let json = br#"{"programs": [], "streams": [{"width": 640, "height": 360}]}"#;
        assert_eq!(parse_probe_output(json).unwrap(), (640, 360));
    }

    #[test]
    fn no_streams_is_error() {
        let json = br#"{"streams": []}"#;
        assert_eq!(parse_probe_output(json).unwrap_err(), "no video stream");
    }

    #[test]
    fn zero_size_is_error() {
        let json = br#"{"streams": [{"width": 0, "height": 480}]}"#;
        assert!(parse_probe_output(json).is_err());
    }

    #[test]
    fn garbage_is_error() {
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[tokio::test]
    async fn missing_file_fails_to_open() {
        let path = std::env::temp_dir().join("liquid-level-missing-video.mp4");
        let err = probe_dimensions("ffprobe", &path).await.unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }
}
