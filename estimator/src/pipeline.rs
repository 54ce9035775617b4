use image::{GrayImage, RgbImage};
use tracing::{debug, info, warn};

use liquid_level_common::frame::Frame;
use liquid_level_common::source::{FrameSource, SourceError};

use crate::abort::AbortSignal;
use crate::level::{level_percentage, FrameMeasurement, LiquidLevelSeries};
use crate::preview::{FrameSink, PreviewView};
use crate::vision::contours::{extract_contours, largest_area, sort_by_area_desc};
use crate::vision::difference::{subtract_saturating, to_luma};
use crate::vision::threshold::otsu_binarize;
use crate::vision::VisionError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("frame {index}: {source}")]
    Vision {
        index: u64,
        #[source]
        source: VisionError,
    },
}

/// Intermediate images of one frame, kept around for the preview sink.
pub struct FrameAnalysis {
    pub difference: RgbImage,
    pub mask: GrayImage,
    pub measurement: FrameMeasurement,
}

/// State threaded through the per-frame steps: the fixed background and the
/// series built so far.
pub struct EstimatorContext {
    background: Frame,
    series: LiquidLevelSeries,
}

impl EstimatorContext {
    pub fn new(background: Frame) -> Self {
        Self {
            background,
            series: LiquidLevelSeries::new(),
        }
    }

    pub fn series(&self) -> &LiquidLevelSeries {
        &self.series
    }

    pub fn into_series(self) -> LiquidLevelSeries {
        self.series
    }

    /// Subtract, threshold and trace one frame without touching the series.
    pub fn analyze(&self, frame: &Frame) -> Result<FrameAnalysis, VisionError> {
        let difference = subtract_saturating(&self.background.image, &frame.image)?;
        let gray = to_luma(&difference);
        let binarized = otsu_binarize(&gray);
        debug!(
            frame = frame.index,
            level = binarized.level,
            foreground = binarized.foreground_pixels(),
            "binarized difference"
        );

        let mut contours = extract_contours(&binarized.mask);
        sort_by_area_desc(&mut contours);
        let largest = largest_area(&contours);
        debug!(
            frame = frame.index,
            contours = contours.len(),
            regions = contours.iter().filter(|c| c.parent.is_none()).count(),
            holes = contours.iter().filter(|c| c.is_hole).count(),
            "traced contours"
        );

        let (width, height) = binarized.mask.dimensions();
        let measurement = FrameMeasurement {
            frame_index: frame.index,
            threshold: binarized.level,
            total_area: width as u64 * height as u64,
            contour_count: contours.len(),
            largest_area: largest,
            percentage: level_percentage(largest, width, height),
        };

        Ok(FrameAnalysis {
            difference,
            mask: binarized.mask,
            measurement,
        })
    }

    /// Measure one frame, append its percentage and feed the previews.
    pub fn process_frame(
        &mut self,
        frame: &Frame,
        sink: &mut dyn FrameSink,
    ) -> Result<FrameMeasurement, PipelineError> {
        let analysis = self.analyze(frame).map_err(|source| PipelineError::Vision {
            index: frame.index,
            source,
        })?;
        let m = analysis.measurement;

        info!(frame = m.frame_index, threshold = m.threshold, "Threshold Value");
        info!(frame = m.frame_index, total_area = m.total_area, "Total Area");
        info!(
            frame = m.frame_index,
            contours = m.contour_count,
            largest_area = m.largest_area,
            percentage = m.percentage,
            "Percentage"
        );

        self.series.push(m.percentage);

        let views = [
            PreviewView::Video(&frame.image),
            PreviewView::Sub(&analysis.difference),
            PreviewView::SubThresh(&analysis.mask),
        ];
        for view in views {
            if let Err(e) = sink.show(frame.index, view) {
                warn!(error = %e, sink = sink.name(), view = view.name(), "preview failed");
            }
        }

        Ok(m)
    }
}

/// Result of a completed (or aborted) run.
#[derive(Debug)]
pub struct RunOutcome {
    pub series: LiquidLevelSeries,
    /// Frames pulled from the source, background included.
    pub frames_decoded: u64,
    pub aborted: bool,
}

/// Run the estimator over every frame of `source`.
///
/// The first frame becomes the background; each later frame adds one value to
/// the series. `abort` is checked before each decode; an aborted run keeps its
/// series. A source error fails the whole run unless the abort was raised
/// while decoding, in which case it is a stop. The source is released and the
/// sink closed on every path.
pub async fn run<S: FrameSource>(
    source: &mut S,
    sink: &mut dyn FrameSink,
    abort: &AbortSignal,
) -> Result<RunOutcome, PipelineError> {
    let result = drive(source, sink, abort).await;
    source.release().await;
    sink.close();
    result
}

async fn drive<S: FrameSource>(
    source: &mut S,
    sink: &mut dyn FrameSink,
    abort: &AbortSignal,
) -> Result<RunOutcome, PipelineError> {
    if abort.is_raised() {
        return Ok(RunOutcome {
            series: LiquidLevelSeries::new(),
            frames_decoded: 0,
            aborted: true,
        });
    }

    let background = match source.next_frame().await {
        Ok(frame) => frame,
        Err(e) => {
            if raised_during(&e, abort).await {
                return Ok(RunOutcome {
                    series: LiquidLevelSeries::new(),
                    frames_decoded: 0,
                    aborted: true,
                });
            }
            return Err(e.into());
        }
    };
    let Some(background) = background else {
        warn!(source = source.name(), "video has no frames");
        return Ok(RunOutcome {
            series: LiquidLevelSeries::new(),
            frames_decoded: 0,
            aborted: false,
        });
    };
    let (width, height) = background.dimensions();
    debug!(width, height, "captured background frame");

    let mut ctx = EstimatorContext::new(background);
    let mut frames_decoded = 1u64;
    let mut aborted = false;

    loop {
        if abort.is_raised() {
            info!(processed = ctx.series().len(), "abort requested, stopping");
            aborted = true;
            break;
        }
        let frame = match source.next_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                if raised_during(&e, abort).await {
                    aborted = true;
                    break;
                }
                return Err(e.into());
            }
        };
        frames_decoded += 1;
        ctx.process_frame(&frame, sink)?;
    }

    Ok(RunOutcome {
        series: ctx.into_series(),
        frames_decoded,
        aborted,
    })
}

/// A decoder interrupted by the same Ctrl-C fails its read; yield once so the
/// signal task can record the abort before the error is judged.
async fn raised_during(err: &SourceError, abort: &AbortSignal) -> bool {
    tokio::task::yield_now().await;
    if !abort.is_raised() {
        return false;
    }
    info!(error = %err, "source stopped after abort request");
    true
}
