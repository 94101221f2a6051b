//! SVG chart sink.
//!
//! Renders backend-neutral [`Chart`] descriptions into standalone SVG
//! documents: explicit min/max scaling into a padded viewport, polylines
//! for series, rects for bars and buckets. No plotting library involved.

pub mod frame;

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::domain::chart::{
    BarValue, Chart, ChartData, Color, HistogramData, LineSeries, ScatterPoint,
};
use crate::domain::error::TradegraphError;
use crate::ports::chart_sink::ChartSink;
use self::frame::{Frame, bounds};

const PADDING: f64 = 60.0;
const TICK_COUNT: usize = 5;
const AXIS_COLOR: &str = "#374151";
const GRID_COLOR: &str = "#e5e7eb";

pub struct SvgChartSink {
    width: f64,
    height: f64,
}

impl SvgChartSink {
    pub fn new() -> Self {
        SvgChartSink {
            width: 900.0,
            height: 420.0,
        }
    }

    fn render(&self, chart: &Chart) -> Result<String, TradegraphError> {
        match &chart.data {
            ChartData::Lines(series) => self.render_lines(chart, series),
            ChartData::Bars(bars) => self.render_bars(chart, bars),
            ChartData::Scatter { points, zero_line } => {
                self.render_scatter(chart, points, *zero_line)
            }
            ChartData::Histogram(hist) => self.render_histogram(chart, hist),
        }
    }

    fn render_lines(&self, chart: &Chart, series: &[LineSeries]) -> Result<String, TradegraphError> {
        let x_range = bounds(
            series
                .iter()
                .flat_map(|s| s.points.iter().map(|&(t, _)| timestamp(t))),
        )
        .ok_or_else(|| empty_chart(chart))?;
        let y_range = bounds(series.iter().flat_map(|s| s.points.iter().map(|&(_, v)| v)))
            .ok_or_else(|| empty_chart(chart))?;

        let frame = self.frame(x_range, y_range);
        let mut body = String::new();
        for s in series.iter().filter(|s| !s.points.is_empty()) {
            let points: Vec<String> = s
                .points
                .iter()
                .map(|&(t, v)| format!("{:.1},{:.1}", frame.x(timestamp(t)), frame.y(v)))
                .collect();
            let _ = writeln!(
                body,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}" />"#,
                hex(s.color),
                points.join(" ")
            );
        }

        let legend: Vec<(String, Color)> = if series.len() > 1 {
            series.iter().map(|s| (s.label.clone(), s.color)).collect()
        } else {
            Vec::new()
        };

        Ok(self.document(chart, &frame, &time_ticks(&frame), &body, &legend))
    }

    fn render_bars(&self, chart: &Chart, bars: &[BarValue]) -> Result<String, TradegraphError> {
        if bars.is_empty() {
            return Err(empty_chart(chart));
        }
        let (v_min, v_max) = bounds(bars.iter().map(|b| b.value)).ok_or_else(|| empty_chart(chart))?;
        let frame = self.frame(
            (-0.5, bars.len() as f64 - 0.5),
            (v_min.min(0.0), v_max.max(0.0)),
        );

        let baseline = frame.y(0.0);
        let mut body = String::new();
        for (i, bar) in bars.iter().enumerate() {
            let x0 = frame.x(i as f64 - 0.4);
            let x1 = frame.x(i as f64 + 0.4);
            let top = frame.y(bar.value).min(baseline);
            let height = (frame.y(bar.value) - baseline).abs();
            let _ = writeln!(
                body,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" />"#,
                x0,
                top,
                x1 - x0,
                height,
                hex(bar.color)
            );
        }

        let ticks = index_ticks(&frame, bars.len());
        Ok(self.document(chart, &frame, &ticks, &body, &[]))
    }

    fn render_scatter(
        &self,
        chart: &Chart,
        points: &[ScatterPoint],
        zero_line: bool,
    ) -> Result<String, TradegraphError> {
        let x_range = bounds(points.iter().map(|p| timestamp(p.time)))
            .ok_or_else(|| empty_chart(chart))?;
        let (v_min, v_max) =
            bounds(points.iter().map(|p| p.value)).ok_or_else(|| empty_chart(chart))?;

        let frame = self.frame(x_range, (v_min.min(0.0), v_max.max(0.0)));
        let mut body = String::new();
        if zero_line {
            let y = frame.y(0.0);
            let _ = writeln!(
                body,
                r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#111827" stroke-dasharray="6 4" />"##,
                frame.padding,
                y,
                frame.width - frame.padding,
                y
            );
        }
        for p in points {
            let _ = writeln!(
                body,
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}" fill-opacity="0.8" />"#,
                frame.x(timestamp(p.time)),
                frame.y(p.value),
                hex(p.color)
            );
        }

        Ok(self.document(chart, &frame, &time_ticks(&frame), &body, &[]))
    }

    fn render_histogram(
        &self,
        chart: &Chart,
        hist: &HistogramData,
    ) -> Result<String, TradegraphError> {
        if hist.counts.is_empty() {
            return Err(empty_chart(chart));
        }

        // The density overlay can extend past the outer bin edges.
        let x_range = bounds(
            hist.bin_edges
                .iter()
                .copied()
                .chain(hist.density.iter().map(|&(x, _)| x)),
        )
        .ok_or_else(|| empty_chart(chart))?;
        let count_max = hist.counts.iter().copied().max().unwrap_or(0) as f64;
        let density_max = hist
            .density
            .iter()
            .map(|&(_, y)| y)
            .fold(0.0_f64, f64::max);
        let frame = self.frame(x_range, (0.0, count_max.max(density_max).max(1.0)));

        let baseline = frame.y(0.0);
        let mut body = String::new();
        for (i, &count) in hist.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let x0 = frame.x(hist.bin_edges[i]);
            let x1 = frame.x(hist.bin_edges[i + 1]);
            let top = frame.y(count as f64);
            let _ = writeln!(
                body,
                r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="0.75" stroke="#ffffff" stroke-width="0.5" />"##,
                x0,
                top,
                x1 - x0,
                baseline - top,
                hex(Color::Purple)
            );
        }
        if !hist.density.is_empty() {
            let points: Vec<String> = hist
                .density
                .iter()
                .map(|&(x, y)| format!("{:.1},{:.1}", frame.x(x), frame.y(y)))
                .collect();
            let _ = writeln!(
                body,
                r##"<polyline fill="none" stroke="#4c1d95" stroke-width="1.5" points="{}" />"##,
                points.join(" ")
            );
        }

        let ticks: Vec<(f64, String)> = frame
            .x_ticks(TICK_COUNT)
            .into_iter()
            .map(|v| (v, format_value(v)))
            .collect();
        Ok(self.document(chart, &frame, &ticks, &body, &[]))
    }

    fn frame(&self, x: (f64, f64), y: (f64, f64)) -> Frame {
        Frame::new(self.width, self.height, PADDING, x, y)
    }

    /// Shared document scaffolding: background, title, axes, gridlines,
    /// tick labels, axis labels, the chart body and an optional legend.
    fn document(
        &self,
        chart: &Chart,
        frame: &Frame,
        x_ticks: &[(f64, String)],
        body: &str,
        legend: &[(String, Color)],
    ) -> String {
        let (w, h, pad) = (frame.width, frame.height, frame.padding);
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#
        );
        let _ = writeln!(
            svg,
            r##"<rect x="0" y="0" width="{w:.0}" height="{h:.0}" fill="#ffffff" />"##
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
            w / 2.0,
            pad / 2.0 + 5.0,
            escape(&chart.title)
        );

        for v in frame.y_ticks(TICK_COUNT) {
            let y = frame.y(v);
            let _ = writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{GRID_COLOR}" />"#,
                pad,
                w - pad
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-family="sans-serif" font-size="10" fill="{AXIS_COLOR}">{}</text>"#,
                pad - 8.0,
                y + 3.5,
                format_value(v)
            );
        }
        for (v, label) in x_ticks {
            let x = frame.x(*v);
            let _ = writeln!(
                svg,
                r#"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="{AXIS_COLOR}" />"#,
                h - pad,
                h - pad + 4.0
            );
            let _ = writeln!(
                svg,
                r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="10" fill="{AXIS_COLOR}">{}</text>"#,
                h - pad + 16.0,
                escape(label)
            );
        }

        // Axis frame on top of the gridlines.
        let _ = writeln!(
            svg,
            r#"<line x1="{pad:.1}" y1="{pad:.1}" x2="{pad:.1}" y2="{:.1}" stroke="{AXIS_COLOR}" />"#,
            h - pad
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{pad:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{AXIS_COLOR}" />"#,
            h - pad,
            w - pad,
            h - pad
        );

        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="12" fill="{AXIS_COLOR}">{}</text>"#,
            w / 2.0,
            h - 12.0,
            escape(&chart.x_label)
        );
        let _ = writeln!(
            svg,
            r#"<text x="18" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="12" fill="{AXIS_COLOR}" transform="rotate(-90 18 {:.1})">{}</text>"#,
            h / 2.0,
            h / 2.0,
            escape(&chart.y_label)
        );

        svg.push_str(body);

        for (i, (label, color)) in legend.iter().enumerate() {
            let y = pad + 14.0 + i as f64 * 16.0;
            let x = w - pad - 140.0;
            let _ = writeln!(
                svg,
                r#"<line x1="{x:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="2" />"#,
                x + 18.0,
                hex(*color)
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="11" fill="{AXIS_COLOR}">{}</text>"#,
                x + 24.0,
                y + 3.5,
                escape(label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

impl Default for SvgChartSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSink for SvgChartSink {
    fn save(&self, chart: &Chart, path: &Path) -> Result<(), TradegraphError> {
        let svg = self.render(chart)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, svg)?;
        Ok(())
    }
}

fn empty_chart(chart: &Chart) -> TradegraphError {
    TradegraphError::ChartRender {
        chart: chart.title.clone(),
        reason: "no drawable data".into(),
    }
}

fn timestamp(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64
}

fn time_ticks(frame: &Frame) -> Vec<(f64, String)> {
    frame
        .x_ticks(TICK_COUNT)
        .into_iter()
        .map(|v| {
            let label = chrono::DateTime::from_timestamp(v as i64, 0)
                .map(|t| t.naive_utc().format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            (v, label)
        })
        .collect()
}

/// Tick labels for bar indices: step chosen so at most ~8 labels appear.
fn index_ticks(frame: &Frame, n: usize) -> Vec<(f64, String)> {
    let step = (n / 8).max(1);
    (0..n)
        .step_by(step)
        .map(|i| (i as f64, i.to_string()))
        .collect::<Vec<_>>()
        .into_iter()
        .filter(|(v, _)| {
            let (min, max) = frame.x_range();
            *v >= min && *v <= max
        })
        .collect()
}

fn format_value(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if v.abs() >= 100.0 || v.fract().abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn hex(color: Color) -> &'static str {
    match color {
        Color::Blue => "#2563eb",
        Color::Orange => "#f97316",
        Color::Green => "#16a34a",
        Color::Red => "#dc2626",
        Color::Purple => "#7c3aed",
        Color::Gray => "#6b7280",
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
