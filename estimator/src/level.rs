use serde::Serialize;

/// `round(100 * largest_area / total_area, 1)`.
///
/// An empty frame area reads as 0.
pub fn level_percentage(largest_area: f64, width: u32, height: u32) -> f64 {
    let total = width as f64 * height as f64;
    if total <= 0.0 {
        return 0.0;
    }
    round_tenths(largest_area / total * 100.0)
}

/// Nearest tenth of the exact binary value, ties to even: 0.25 reads 0.2,
/// 0.35 (stored just below) reads 0.3.
fn round_tenths(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Everything measured for one processed frame. Only `percentage` goes into
/// the series; the rest is logged.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMeasurement {
    pub frame_index: u64,
    pub threshold: u8,
    pub total_area: u64,
    pub contour_count: usize,
    pub largest_area: f64,
    pub percentage: f64,
}

/// Append-only liquid level time series, one value per processed frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LiquidLevelSeries {
    values: Vec<f64>,
}

impl LiquidLevelSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, percentage: f64) {
        self.values.push(percentage);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }
}
