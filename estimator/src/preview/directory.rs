use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::traits::{FrameSink, PreviewView, SinkError};

/// Writes PNG snapshots of the preview views into a directory.
///
/// Only every `every_n`-th frame index is written, e.g.
/// `preview/000010_sub_thresh.png`.
pub struct DirectorySink {
    dir: PathBuf,
    every_n: u64,
    written: u64,
}

impl DirectorySink {
    pub fn new(dir: &Path, every_n: u64) -> Result<Self, SinkError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| SinkError::CreateDir(dir.display().to_string(), e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            every_n: every_n.max(1),
            written: 0,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn path_for(&self, frame_index: u64, view: &PreviewView<'_>) -> PathBuf {
        self.dir
            .join(format!("{frame_index:06}_{}.png", view.slug()))
    }
}

impl FrameSink for DirectorySink {
    fn show(&mut self, frame_index: u64, view: PreviewView<'_>) -> Result<(), SinkError> {
        if frame_index % self.every_n != 0 {
            return Ok(());
        }

        let path = self.path_for(frame_index, &view);
        let result = match view {
            PreviewView::Video(img) | PreviewView::Sub(img) => img.save(&path),
            PreviewView::SubThresh(mask) => mask.save(&path),
        };
        result.map_err(|e| SinkError::Write(path.display().to_string(), e))?;

        self.written += 1;
        debug!(path = path.display().to_string(), view = view.name(), "wrote preview");
        Ok(())
    }

    fn close(&mut self) {
        info!(
            dir = self.dir.display().to_string(),
            written = self.written(),
            "preview snapshots closed"
        );
    }

    fn name(&self) -> &str {
        "directory"
    }
}
