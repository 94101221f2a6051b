//! Backend-neutral chart descriptions.
//!
//! The domain builds [`Chart`] values; a [`crate::ports::chart_sink::ChartSink`]
//! turns them into artifacts. Nothing here knows how a chart is drawn.

use chrono::NaiveDateTime;

/// Fixed bin count for the PnL distribution histogram.
pub const HISTOGRAM_BINS: usize = 40;

/// Number of sample points for the smoothed density overlay.
const DENSITY_SAMPLES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    EquityCurve,
    EquityVsBuyHold,
    PnlPerTrade,
    PnlOverTime,
    PnlDistribution,
}

impl ChartKind {
    /// Filename stem appended to the configured prefix.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartKind::EquityCurve => "equity_curve",
            ChartKind::EquityVsBuyHold => "equity_vs_buyhold",
            ChartKind::PnlPerTrade => "pnl_per_trade",
            ChartKind::PnlOverTime => "pnl_over_time",
            ChartKind::PnlDistribution => "pnl_distribution",
        }
    }
}

/// Semantic palette; the sink decides the concrete rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Blue,
    Orange,
    Green,
    Red,
    Purple,
    Gray,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub color: Color,
    pub points: Vec<(NaiveDateTime, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarValue {
    pub value: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub time: NaiveDateTime,
    pub value: f64,
    pub color: Color,
}

/// Equal-width histogram plus a smoothed density overlay scaled to the
/// count axis.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramData {
    /// `counts.len() + 1` edges, ascending.
    pub bin_edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub density: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Lines(Vec<LineSeries>),
    Bars(Vec<BarValue>),
    Scatter {
        points: Vec<ScatterPoint>,
        zero_line: bool,
    },
    Histogram(HistogramData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

/// Bin `values` into `bins` equal-width buckets over their full range and
/// attach the density overlay. A degenerate range (all values equal)
/// collapses into one populated bucket around the common value.
pub fn histogram(values: &[f64], bins: usize) -> HistogramData {
    assert!(bins > 0);
    if values.is_empty() {
        return HistogramData {
            bin_edges: Vec::new(),
            counts: Vec::new(),
            density: Vec::new(),
        };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if max > min {
        (min, max)
    } else {
        (min - 0.5, min + 0.5)
    };
    let width = (max - min) / bins as f64;

    let bin_edges: Vec<f64> = (0..=bins).map(|i| min + i as f64 * width).collect();
    let mut counts = vec![0usize; bins];
    for &v in values {
        // The top edge belongs to the last bucket.
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let density = density_overlay(values, width);

    HistogramData {
        bin_edges,
        counts,
        density,
    }
}

/// Gaussian kernel density estimate with Scott's bandwidth, scaled by
/// `n * bin_width` so the curve overlays the count axis directly. Empty
/// when the sample has no spread (bandwidth zero).
fn density_overlay(values: &[f64], bin_width: f64) -> Vec<(f64, f64)> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let bandwidth = std_dev * n.powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;
    let step = (max - min) / (DENSITY_SAMPLES - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..DENSITY_SAMPLES)
        .map(|i| {
            let x = min + i as f64 * step;
            let density: f64 = values
                .iter()
                .map(|&v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density * n * bin_width)
        })
        .collect()
}
