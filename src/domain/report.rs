//! Report configuration and the declarative chart table.
//!
//! Each chart kind pairs a required-field check with a build function.
//! [`build_charts`] walks the table once; a kind whose check fails is
//! skipped without comment. This is the single place that decides which
//! charts a given record set can support.

use std::path::PathBuf;

use crate::domain::chart::{
    BarValue, Chart, ChartData, ChartKind, Color, HISTOGRAM_BINS, LineSeries, ScatterPoint,
    histogram,
};
use crate::domain::series::DerivedSeries;
use crate::domain::trade::{Direction, TradeRecord};

pub const DEFAULT_RESULTS_PATH: &str = "backtest_results.json";
pub const DEFAULT_OUTPUT_DIR: &str = "logs";
pub const DEFAULT_PREFIX: &str = "backtest";
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Explicit pipeline configuration. Every field has a process-wide
/// default; CLI flags and the config file only override.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub results_path: PathBuf,
    pub output_dir: PathBuf,
    pub prefix: String,
    pub initial_capital: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            prefix: DEFAULT_PREFIX.to_string(),
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

struct ChartBuilder {
    kind: ChartKind,
    required: fn(&[TradeRecord], &DerivedSeries) -> bool,
    build: fn(&[TradeRecord], &DerivedSeries) -> Chart,
}

const CHART_TABLE: [ChartBuilder; 5] = [
    ChartBuilder {
        kind: ChartKind::EquityCurve,
        required: requires_timed_capital,
        build: build_equity_curve,
    },
    ChartBuilder {
        kind: ChartKind::EquityVsBuyHold,
        required: requires_timed_capital_and_benchmark,
        build: build_equity_vs_buy_hold,
    },
    ChartBuilder {
        kind: ChartKind::PnlPerTrade,
        required: requires_net_pnl,
        build: build_pnl_per_trade,
    },
    ChartBuilder {
        kind: ChartKind::PnlOverTime,
        required: requires_timed_net_pnl,
        build: build_pnl_over_time,
    },
    ChartBuilder {
        kind: ChartKind::PnlDistribution,
        required: requires_net_pnl,
        build: build_pnl_distribution,
    },
];

fn requires_timed_capital(records: &[TradeRecord], _series: &DerivedSeries) -> bool {
    all_have(records, |r| {
        r.exit_time.is_some() && r.capital_after_exit.is_some()
    })
}

fn requires_timed_capital_and_benchmark(records: &[TradeRecord], series: &DerivedSeries) -> bool {
    requires_timed_capital(records, series) && series.buy_hold_capital.is_some()
}

fn requires_net_pnl(records: &[TradeRecord], _series: &DerivedSeries) -> bool {
    all_have(records, |r| r.net_pnl.is_some())
}

fn requires_timed_net_pnl(records: &[TradeRecord], _series: &DerivedSeries) -> bool {
    all_have(records, |r| r.exit_time.is_some() && r.net_pnl.is_some())
}

fn all_have(records: &[TradeRecord], check: fn(&TradeRecord) -> bool) -> bool {
    !records.is_empty() && records.iter().all(check)
}

/// Evaluate the chart table against the sorted records and their derived
/// series. Returns the buildable charts in table order.
pub fn build_charts(records: &[TradeRecord], series: &DerivedSeries) -> Vec<Chart> {
    CHART_TABLE
        .iter()
        .filter(|builder| (builder.required)(records, series))
        .map(|builder| {
            let chart = (builder.build)(records, series);
            debug_assert_eq!(chart.kind, builder.kind);
            chart
        })
        .collect()
}

fn time_series(records: &[TradeRecord], value: fn(&TradeRecord) -> Option<f64>) -> Vec<(chrono::NaiveDateTime, f64)> {
    records
        .iter()
        .filter_map(|r| Some((r.exit_time?, value(r)?)))
        .collect()
}

fn build_equity_curve(records: &[TradeRecord], series: &DerivedSeries) -> Chart {
    let mut lines = vec![LineSeries {
        label: "With spread".to_string(),
        color: Color::Blue,
        points: time_series(records, |r| r.capital_after_exit),
    }];

    // Same trades with the spread cost removed, when that series exists.
    if let Some(capital) = &series.no_spread_capital {
        lines.push(LineSeries {
            label: "Without spread".to_string(),
            color: Color::Orange,
            points: records
                .iter()
                .zip(capital)
                .filter_map(|(r, &c)| Some((r.exit_time?, c)))
                .collect(),
        });
    }

    Chart {
        kind: ChartKind::EquityCurve,
        title: "Equity Curve".to_string(),
        x_label: "Time".to_string(),
        y_label: "Account balance".to_string(),
        data: ChartData::Lines(lines),
    }
}

fn build_equity_vs_buy_hold(records: &[TradeRecord], series: &DerivedSeries) -> Chart {
    let buy_hold = series
        .buy_hold_capital
        .as_deref()
        .unwrap_or_default();

    Chart {
        kind: ChartKind::EquityVsBuyHold,
        title: "Strategy vs. Buy & Hold".to_string(),
        x_label: "Time".to_string(),
        y_label: "Account balance".to_string(),
        data: ChartData::Lines(vec![
            LineSeries {
                label: "Strategy".to_string(),
                color: Color::Blue,
                points: time_series(records, |r| r.capital_after_exit),
            },
            LineSeries {
                label: "Buy & Hold".to_string(),
                color: Color::Orange,
                points: records
                    .iter()
                    .zip(buy_hold)
                    .filter_map(|(r, &c)| Some((r.exit_time?, c)))
                    .collect(),
            },
        ]),
    }
}

fn build_pnl_per_trade(records: &[TradeRecord], _series: &DerivedSeries) -> Chart {
    let bars = records
        .iter()
        .filter_map(|r| r.net_pnl)
        .map(|pnl| BarValue {
            value: pnl,
            // Zero PnL draws in the loss color; only strict gains are green.
            color: if pnl > 0.0 { Color::Green } else { Color::Red },
        })
        .collect();

    Chart {
        kind: ChartKind::PnlPerTrade,
        title: "PnL per Trade".to_string(),
        x_label: "Trade number".to_string(),
        y_label: "Profit / loss".to_string(),
        data: ChartData::Bars(bars),
    }
}

fn build_pnl_over_time(records: &[TradeRecord], _series: &DerivedSeries) -> Chart {
    let colored = records.iter().any(|r| r.direction.is_some());
    let points = records
        .iter()
        .filter_map(|r| {
            let color = if colored {
                match r.direction {
                    Some(Direction::Long) => Color::Blue,
                    Some(Direction::Short) => Color::Orange,
                    None => Color::Gray,
                }
            } else {
                Color::Blue
            };
            Some(ScatterPoint {
                time: r.exit_time?,
                value: r.net_pnl?,
                color,
            })
        })
        .collect();

    Chart {
        kind: ChartKind::PnlOverTime,
        title: "Trade PnL over Time".to_string(),
        x_label: "Exit time".to_string(),
        y_label: "Net PnL".to_string(),
        data: ChartData::Scatter {
            points,
            zero_line: true,
        },
    }
}

fn build_pnl_distribution(records: &[TradeRecord], _series: &DerivedSeries) -> Chart {
    let values: Vec<f64> = records.iter().filter_map(|r| r.net_pnl).collect();

    Chart {
        kind: ChartKind::PnlDistribution,
        title: "Distribution of Net PnL".to_string(),
        x_label: "Net PnL".to_string(),
        y_label: "Frequency".to_string(),
        data: ChartData::Histogram(histogram(&values, HISTOGRAM_BINS)),
    }
}
