use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use liquid_level_common::config::DecoderConfig;
use liquid_level_common::frame::Frame;
use liquid_level_common::source::{FrameSource, SourceError};

use crate::probe::probe_dimensions;
use crate::raw::RawFrameReader;

/// Decodes a video file by piping it through an ffmpeg subprocess as rgb24.
pub struct FfmpegSource {
    child: Option<Child>,
    reader: RawFrameReader<ChildStdout>,
    stderr: Option<JoinHandle<String>>,
    finished: bool,
}

/// ffmpeg arguments for streaming `path` as raw rgb24 on stdout.
///
/// `-noautorotate` keeps frames in stored orientation so they match the
/// dimensions ffprobe reports.
fn decode_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "error", "-nostdin", "-noautorotate", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(path.as_os_str().to_owned());
    args.extend(
        ["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"]
            .into_iter()
            .map(OsString::from),
    );
    args
}

/// Read a child's stderr to the end in the background so ffmpeg never blocks
/// on a full pipe while we wait on stdout.
fn drain_stderr<R>(mut pipe: R) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            debug!(error = %e, "stopped reading ffmpeg stderr");
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

impl FfmpegSource {
    /// Probe the video and spawn ffmpeg ready to stream raw frames on stdout.
    pub async fn open(path: &Path, config: &DecoderConfig) -> Result<Self, SourceError> {
        let (width, height) = probe_dimensions(&config.ffprobe_bin, path).await?;
        let shown = path.display().to_string();

        let mut cmd = Command::new(&config.ffmpeg_bin);
        cmd.args(decode_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group: a terminal Ctrl-C reaches us, not the decoder.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| SourceError::Open {
            path: shown.clone(),
            reason: format!("failed to spawn {}: {e}", config.ffmpeg_bin),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| SourceError::Open {
            path: shown.clone(),
            reason: "could not get ffmpeg stdout handle".into(),
        })?;
        let stderr = child.stderr.take().map(drain_stderr);

        info!(path = shown, width, height, "opened video");

        Ok(Self {
            child: Some(child),
            reader: RawFrameReader::new(stdout, width, height),
            stderr,
            finished: false,
        })
    }

    /// Called once the pipe hits EOF: a non-zero ffmpeg exit means the decode
    /// failed rather than the stream ending.
    async fn check_exit(&mut self) -> Result<(), SourceError> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };
        let status = child
            .wait()
            .await
            .map_err(|e| SourceError::Decoder(e.to_string()))?;
        if status.success() {
            return Ok(());
        }

        let stderr = match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };
        error!(status = %status, stderr = %stderr.trim(), "ffmpeg exited with error");
        Err(SourceError::Decoder(format!("{status}: {}", stderr.trim())))
    }
}

impl FrameSource for FfmpegSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.finished {
            return Ok(None);
        }
        match self.reader.read_frame().await? {
            Some(frame) => Ok(Some(frame)),
            None => {
                self.finished = true;
                self.check_exit().await?;
                debug!(frames = self.reader.frames_read(), "end of video stream");
                Ok(None)
            }
        }
    }

    async fn release(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        self.finished = true;

        if let Ok(Some(_)) = child.try_wait() {
            debug!("ffmpeg already exited");
            return;
        }
        if let Err(e) = child.kill().await {
            warn!(error = %e, "failed to kill ffmpeg decoder");
        } else {
            debug!(frames = self.reader.frames_read(), "ffmpeg decoder released");
        }
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Check whether ffmpeg is available on PATH. Logs a warning if not found.
pub async fn check_ffmpeg_available(ffmpeg_bin: &str) {
    match Command::new(ffmpeg_bin).arg("-version").output().await {
        Ok(out) if out.status.success() => {
            debug!("ffmpeg is available");
        }
        Ok(_) => {
            warn!("ffmpeg returned non-zero for -version; decoding may fail");
        }
        Err(e) => {
            warn!(
                error = %e,
                "ffmpeg not found on PATH; decoding will fail. Install ffmpeg and ffprobe."
            );
        }
    }
}
