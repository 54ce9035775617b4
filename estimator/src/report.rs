use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::level::LiquidLevelSeries;
use crate::pipeline::RunOutcome;

/// JSON summary of a run.
#[derive(Debug, Serialize)]
pub struct SeriesReport<'a> {
    pub video: String,
    pub generated_at: String,
    pub frames_decoded: u64,
    pub frames_processed: usize,
    pub aborted: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub levels: &'a LiquidLevelSeries,
}

impl<'a> SeriesReport<'a> {
    pub fn new(video: &Path, outcome: &'a RunOutcome) -> Self {
        let series = &outcome.series;
        Self {
            video: video.display().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            frames_decoded: outcome.frames_decoded,
            frames_processed: series.len(),
            aborted: outcome.aborted,
            min: series.min(),
            max: series.max(),
            mean: series.mean(),
            levels: series,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to create report file {0}: {1}")]
    Create(String, std::io::Error),
    #[error("failed to write report {0}: {1}")]
    Write(String, String),
}

pub fn write_report(path: &Path, report: &SeriesReport<'_>) -> Result<(), ReportError> {
    let shown = path.display().to_string();
    let file = std::fs::File::create(path).map_err(|e| ReportError::Create(shown.clone(), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| ReportError::Write(shown.clone(), e.to_string()))?;
    writer
        .flush()
        .map_err(|e| ReportError::Write(shown.clone(), e.to_string()))?;
    info!(path = shown, frames = report.frames_processed, "wrote series report");
    Ok(())
}
