#![allow(dead_code)]

use serde_json::{Value, json};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tradegraph::domain::chart::Chart;
use tradegraph::domain::error::TradegraphError;
use tradegraph::domain::report::ReportConfig;
use tradegraph::ports::chart_sink::ChartSink;

/// Chart sink that records what would have been saved without touching
/// the filesystem.
pub struct RecordingChartSink {
    pub saved: RefCell<Vec<(Chart, PathBuf)>>,
}

impl RecordingChartSink {
    pub fn new() -> Self {
        Self {
            saved: RefCell::new(Vec::new()),
        }
    }

    pub fn saved_stems(&self) -> Vec<String> {
        self.saved
            .borrow()
            .iter()
            .map(|(_, path)| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

impl ChartSink for RecordingChartSink {
    fn save(&self, chart: &Chart, path: &Path) -> Result<(), TradegraphError> {
        self.saved
            .borrow_mut()
            .push((chart.clone(), path.to_path_buf()));
        Ok(())
    }
}

/// A fully populated trade on the given January 2024 day.
pub fn trade_value(day: u32, pnl: f64, direction: &str) -> Value {
    json!({
        "entry_time": format!("2024-01-{day:02}T09:00:00"),
        "exit_time": format!("2024-01-{day:02}T17:00:00"),
        "mid_price_entry": 100.0,
        "mid_price_exit": 100.0 + pnl,
        "position_size": 1.0,
        "direction": direction,
        "slippage_entry": 0.0,
        "slippage_exit": 0.0,
        "capital_after_exit": 100_000.0 + pnl,
        "net_pnl": pnl
    })
}

pub fn write_json_log(dir: &Path, trades: &[Value]) -> PathBuf {
    let path = dir.join("backtest_results.json");
    std::fs::write(&path, json!({ "trades": trades }).to_string()).unwrap();
    path
}

pub fn config_for(results_path: PathBuf, output_dir: PathBuf) -> ReportConfig {
    ReportConfig {
        results_path,
        output_dir,
        prefix: "backtest".to_string(),
        initial_capital: 100_000.0,
    }
}
