//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_log_adapter::CsvLogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_log_adapter::JsonLogAdapter;
use crate::adapters::svg_chart::SvgChartSink;
use crate::domain::error::TradegraphError;
use crate::domain::report::{ReportConfig, build_charts};
use crate::domain::series::DerivedSeries;
use crate::domain::trade::sort_by_exit_time;
use crate::ports::chart_sink::ChartSink;
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_log_port::TradeLogPort;

#[derive(Parser, Debug)]
#[command(name = "tradegraph", about = "Backtest trade-log chart generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate charts from a completed trade log
    Generate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trade-log artifact (overrides config)
        #[arg(long)]
        results: Option<PathBuf>,
        /// Directory for the chart artifacts (overrides config)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Filename prefix for the chart artifacts (overrides config)
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Show trade count and exit-time range for a trade log
    Info {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        results: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Generate {
            config,
            results,
            output_dir,
            prefix,
        } => run_generate(config.as_ref(), results, output_dir, prefix),
        Command::Info { config, results } => run_info(config.as_ref(), results),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TradegraphError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Assemble the pipeline configuration: documented defaults, overridden
/// first by the config file, then by CLI flags.
pub fn build_report_config(
    adapter: Option<&dyn ConfigPort>,
    results: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    prefix: Option<String>,
) -> ReportConfig {
    let mut config = ReportConfig::default();

    if let Some(adapter) = adapter {
        if let Some(path) = adapter.get_string("report", "results_path") {
            config.results_path = PathBuf::from(path);
        }
        if let Some(dir) = adapter.get_string("report", "output_dir") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = adapter.get_string("report", "prefix") {
            config.prefix = prefix;
        }
        config.initial_capital =
            adapter.get_double("backtest", "initial_capital", config.initial_capital);
    }

    if let Some(path) = results {
        config.results_path = path;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(prefix) = prefix {
        config.prefix = prefix;
    }

    config
}

/// Pick the log adapter: explicit `[report] format` wins, otherwise the
/// file extension decides, defaulting to JSON.
pub fn select_log_port(
    adapter: Option<&dyn ConfigPort>,
    results_path: &std::path::Path,
) -> Box<dyn TradeLogPort> {
    let format = adapter
        .and_then(|a| a.get_string("report", "format"))
        .map(|f| f.to_lowercase());

    let is_csv = match format.as_deref() {
        Some("csv") => true,
        Some(_) => false,
        None => results_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv")),
    };

    if is_csv {
        Box::new(CsvLogAdapter::new())
    } else {
        Box::new(JsonLogAdapter::new())
    }
}

/// Full pipeline: load, sort, derive, evaluate the chart table, emit.
///
/// A missing artifact or an empty trade list is a soft no-op: one warning,
/// no artifacts, `Ok`. Returns the paths actually written.
pub fn run_report_pipeline(
    log_port: &dyn TradeLogPort,
    sink: &dyn ChartSink,
    config: &ReportConfig,
) -> Result<Vec<PathBuf>, TradegraphError> {
    if !config.results_path.exists() {
        eprintln!(
            "warning: trade log not found: {}",
            config.results_path.display()
        );
        return Ok(Vec::new());
    }

    let mut records = log_port.load_trades(&config.results_path)?;
    if records.is_empty() {
        eprintln!(
            "warning: no trades in {}; skipping chart generation",
            config.results_path.display()
        );
        return Ok(Vec::new());
    }

    sort_by_exit_time(&mut records);
    let series = DerivedSeries::derive(&records, config.initial_capital);
    let charts = build_charts(&records, &series);

    fs::create_dir_all(&config.output_dir)?;

    let mut written = Vec::with_capacity(charts.len());
    for chart in &charts {
        let path = config
            .output_dir
            .join(format!("{}_{}.svg", config.prefix, chart.kind.file_stem()));
        sink.save(chart, &path)?;
        eprintln!("Chart written to: {}", path.display());
        written.push(path);
    }

    Ok(written)
}

fn run_generate(
    config_path: Option<&PathBuf>,
    results: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    prefix: Option<String>,
) -> ExitCode {
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(a) => Some(a),
                Err(code) => return code,
            }
        }
        None => None,
    };
    let adapter_ref = adapter.as_ref().map(|a| a as &dyn ConfigPort);

    let config = build_report_config(adapter_ref, results, output_dir, prefix);
    let log_port = select_log_port(adapter_ref, &config.results_path);
    let sink = SvgChartSink::new();

    match run_report_pipeline(log_port.as_ref(), &sink, &config) {
        Ok(paths) => {
            eprintln!("{} chart(s) written", paths.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_info(config_path: Option<&PathBuf>, results: Option<PathBuf>) -> ExitCode {
    let adapter = match config_path {
        Some(path) => match load_config(path) {
            Ok(a) => Some(a),
            Err(code) => return code,
        },
        None => None,
    };
    let adapter_ref = adapter.as_ref().map(|a| a as &dyn ConfigPort);

    let config = build_report_config(adapter_ref, results, None, None);
    if !config.results_path.exists() {
        eprintln!(
            "warning: trade log not found: {}",
            config.results_path.display()
        );
        return ExitCode::SUCCESS;
    }

    let log_port = select_log_port(adapter_ref, &config.results_path);
    let mut records = match log_port.load_trades(&config.results_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    sort_by_exit_time(&mut records);
    println!("{}: {} trades", config.results_path.display(), records.len());

    let timestamped: Vec<_> = records.iter().filter_map(|r| r.exit_time).collect();
    match (timestamped.first(), timestamped.last()) {
        (Some(first), Some(last)) => println!("exit times: {first} to {last}"),
        _ => println!("exit times: none recorded"),
    }

    ExitCode::SUCCESS
}
