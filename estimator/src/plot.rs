use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use crate::level::LiquidLevelSeries;

pub const TITLE: &str = "Liquid Level Plot Over Video Duration";
pub const X_LABEL: &str = "Frame Number";
pub const Y_LABEL: &str = "Liquid Level (%)";
pub const LEGEND: &str = "Liquid Level (%)";

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("failed to render plot {0}: {1}")]
    Render(String, String),
}

/// Render the series as an SVG line chart. An empty series still produces a
/// chart with axes and legend.
pub fn render_series(
    series: &LiquidLevelSeries,
    path: &Path,
    (width, height): (u32, u32),
) -> Result<(), PlotError> {
    let shown = path.display().to_string();
    draw(series, path, (width, height)).map_err(|e| PlotError::Render(shown.clone(), e))?;
    info!(path = shown, points = series.len(), "rendered liquid level plot");
    Ok(())
}

fn draw(series: &LiquidLevelSeries, path: &Path, size: (u32, u32)) -> Result<(), String> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let x_max = series.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(0f64..x_max, 0f64..100f64)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(LineSeries::new(
            series.values().iter().enumerate().map(|(i, &v)| (i as f64, v)),
            &BLUE,
        ))
        .map_err(|e| e.to_string())?
        .label(LEGEND)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_svg(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("liquid-level-{name}-{}.svg", std::process::id()))
    }

    #[test]
    fn empty_series_renders() {
        let path = temp_svg("empty");
        render_series(&LiquidLevelSeries::new(), &path, (640, 480)).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(X_LABEL));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn series_renders_with_labels() {
        let path = temp_svg("series");
        let mut series = LiquidLevelSeries::new();
        for v in [0.0, 12.5, 30.1, 30.4, 55.0] {
            series.push(v);
        }
        render_series(&series, &path, (640, 480)).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains(TITLE));
        assert!(svg.contains(LEGEND));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unwritable_path_is_error() {
        let path = std::env::temp_dir()
            .join("liquid-level-no-such-dir")
            .join("nested")
            .join("plot.svg");
        let result = render_series(&LiquidLevelSeries::new(), &path, (320, 240));
        assert!(matches!(result, Err(PlotError::Render(_, _))));
    }
}
