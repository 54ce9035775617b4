mod abort;
mod level;
mod pipeline;
mod plot;
mod preview;
mod report;
mod vision;

use abort::AbortSignal;
use liquid_level_common::config::Config;
use liquid_level_decoder::ffmpeg::check_ffmpeg_available;
use liquid_level_decoder::FfmpegSource;
use preview::{DirectorySink, FrameSink, NoopSink};
use report::SeriesReport;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let mut config = match Config::load_or_default(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };
    if let Some(video) = args.next() {
        config.input.video_path = PathBuf::from(video);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        video = config.input.video_path.display().to_string(),
        plot = config.output.plot_path.display().to_string(),
        preview = config.preview.enabled,
        "starting liquid level estimator"
    );

    check_ffmpeg_available(&config.decoder.ffmpeg_bin).await;

    let abort = AbortSignal::new();
    {
        let abort = abort.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, finishing current frame");
                abort.raise();
            }
        });
    }

    let mut source = match FfmpegSource::open(&config.input.video_path, &config.decoder).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to open video");
            std::process::exit(1);
        }
    };

    let mut sink: Box<dyn FrameSink> = if config.preview.enabled {
        match DirectorySink::new(&config.preview.dir, config.preview.every_n) {
            Ok(s) => Box::new(s),
            Err(e) => {
                warn!(error = %e, "preview disabled");
                Box::new(NoopSink)
            }
        }
    } else {
        Box::new(NoopSink)
    };

    let outcome = match pipeline::run(&mut source, sink.as_mut(), &abort).await {
        Ok(o) => o,
        Err(e) => {
            error!(error = %e, "liquid level estimation failed");
            std::process::exit(1);
        }
    };

    info!(
        frames_decoded = outcome.frames_decoded,
        frames_processed = outcome.series.len(),
        aborted = outcome.aborted,
        min = outcome.series.min(),
        max = outcome.series.max(),
        mean = outcome.series.mean(),
        last = outcome.series.last(),
        "run complete"
    );

    if outcome.series.is_empty() {
        warn!("no frames after the background frame, plotting an empty series");
    }

    let plot_size = (config.output.plot_width, config.output.plot_height);
    if let Err(e) = plot::render_series(&outcome.series, &config.output.plot_path, plot_size) {
        error!(error = %e, "failed to render plot");
        std::process::exit(1);
    }

    if let Some(report_path) = &config.output.report_path {
        let report = SeriesReport::new(&config.input.video_path, &outcome);
        if let Err(e) = report::write_report(report_path, &report) {
            error!(error = %e, "failed to write series report");
            std::process::exit(1);
        }
    }
}
