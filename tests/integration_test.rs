//! End-to-end pipeline tests: load, sort, derive, emit.

mod common;

use common::*;
use serde_json::json;
use tempfile::tempdir;

use tradegraph::adapters::json_log_adapter::JsonLogAdapter;
use tradegraph::adapters::svg_chart::SvgChartSink;
use tradegraph::cli::run_report_pipeline;
use tradegraph::domain::chart::ChartData;

mod full_pipeline {
    use super::*;

    #[test]
    fn complete_log_emits_all_five_charts_in_order() {
        let dir = tempdir().unwrap();
        let log = write_json_log(
            dir.path(),
            &[
                trade_value(1, 120.0, "LONG"),
                trade_value(2, -45.0, "SHORT"),
                trade_value(3, 0.0, "LONG"),
            ],
        );
        let sink = RecordingChartSink::new();
        let config = config_for(log, dir.path().join("charts"));

        let written = run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();

        assert_eq!(written.len(), 5);
        assert_eq!(
            sink.saved_stems(),
            vec![
                "backtest_equity_curve",
                "backtest_equity_vs_buyhold",
                "backtest_pnl_per_trade",
                "backtest_pnl_over_time",
                "backtest_pnl_distribution",
            ]
        );
    }

    #[test]
    fn custom_prefix_names_the_artifacts() {
        let dir = tempdir().unwrap();
        let log = write_json_log(dir.path(), &[trade_value(1, 10.0, "LONG")]);
        let sink = RecordingChartSink::new();
        let mut config = config_for(log, dir.path().join("charts"));
        config.prefix = "gold".to_string();

        run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();

        assert!(
            sink.saved_stems()
                .iter()
                .all(|stem| stem.starts_with("gold_"))
        );
    }

    #[test]
    fn records_are_sorted_before_charting() {
        let dir = tempdir().unwrap();
        // Deliberately out of file order.
        let log = write_json_log(
            dir.path(),
            &[
                trade_value(3, 30.0, "LONG"),
                trade_value(1, 10.0, "LONG"),
                trade_value(2, 20.0, "LONG"),
            ],
        );
        let sink = RecordingChartSink::new();
        let config = config_for(log, dir.path().join("charts"));

        run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();

        let saved = sink.saved.borrow();
        let (equity, _) = &saved[0];
        match &equity.data {
            ChartData::Lines(lines) => {
                let times: Vec<_> = lines[0].points.iter().map(|&(t, _)| t).collect();
                let mut sorted = times.clone();
                sorted.sort();
                assert_eq!(times, sorted);
            }
            other => panic!("expected lines, got {other:?}"),
        }
    }

    #[test]
    fn svg_artifacts_land_on_disk() {
        let dir = tempdir().unwrap();
        let log = write_json_log(
            dir.path(),
            &[trade_value(1, 50.0, "LONG"), trade_value(2, -20.0, "SHORT")],
        );
        let out = dir.path().join("charts");
        let config = config_for(log, out.clone());

        let written =
            run_report_pipeline(&JsonLogAdapter::new(), &SvgChartSink::new(), &config).unwrap();

        assert_eq!(written.len(), 5);
        for path in &written {
            assert!(path.exists(), "missing {}", path.display());
            let contents = std::fs::read_to_string(path).unwrap();
            assert!(contents.contains("<svg"));
        }
    }

    #[test]
    fn rerun_is_deterministic() {
        let dir = tempdir().unwrap();
        let log = write_json_log(
            dir.path(),
            &[trade_value(1, 33.0, "LONG"), trade_value(2, -12.0, "SHORT")],
        );
        let out = dir.path().join("charts");
        let config = config_for(log, out.clone());
        let sink = SvgChartSink::new();

        let first = run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();
        let snapshot: Vec<String> = first
            .iter()
            .map(|p| std::fs::read_to_string(p).unwrap())
            .collect();

        let second = run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();
        assert_eq!(first, second);
        for (path, before) in second.iter().zip(&snapshot) {
            assert_eq!(&std::fs::read_to_string(path).unwrap(), before);
        }
    }
}

mod soft_failures {
    use super::*;

    #[test]
    fn missing_artifact_is_a_no_op() {
        let dir = tempdir().unwrap();
        let sink = RecordingChartSink::new();
        let config = config_for(
            dir.path().join("does_not_exist.json"),
            dir.path().join("charts"),
        );

        let written = run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();

        assert!(written.is_empty());
        assert!(sink.saved.borrow().is_empty());
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn empty_trades_is_a_no_op() {
        let dir = tempdir().unwrap();
        let log = write_json_log(dir.path(), &[]);
        let sink = RecordingChartSink::new();
        let config = config_for(log, dir.path().join("charts"));

        let written = run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();

        assert!(written.is_empty());
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn malformed_artifact_is_an_error() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("broken.json");
        std::fs::write(&log, "{oops").unwrap();
        let sink = RecordingChartSink::new();
        let config = config_for(log, dir.path().join("charts"));

        let result = run_report_pipeline(&JsonLogAdapter::new(), &sink, &config);
        assert!(result.is_err());
    }
}

mod graceful_degradation {
    use super::*;

    #[test]
    fn log_without_net_pnl_still_renders_equity_charts() {
        let dir = tempdir().unwrap();
        let trades: Vec<_> = [1, 2]
            .map(|day| {
                let mut t = trade_value(day, 15.0, "LONG");
                t.as_object_mut().unwrap().remove("net_pnl");
                t
            })
            .into_iter()
            .collect();
        let log = write_json_log(dir.path(), &trades);
        let sink = RecordingChartSink::new();
        let config = config_for(log, dir.path().join("charts"));

        run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();

        assert_eq!(
            sink.saved_stems(),
            vec!["backtest_equity_curve", "backtest_equity_vs_buyhold"]
        );
    }

    #[test]
    fn zero_reference_price_skips_the_benchmark_chart() {
        let dir = tempdir().unwrap();
        let mut first = trade_value(1, 10.0, "LONG");
        first
            .as_object_mut()
            .unwrap()
            .insert("mid_price_exit".into(), json!(0.0));
        let log = write_json_log(dir.path(), &[first, trade_value(2, 20.0, "LONG")]);
        let sink = RecordingChartSink::new();
        let config = config_for(log, dir.path().join("charts"));

        run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();

        let stems = sink.saved_stems();
        assert!(!stems.contains(&"backtest_equity_vs_buyhold".to_string()));
        assert!(stems.contains(&"backtest_equity_curve".to_string()));
    }

    #[test]
    fn bare_pnl_log_renders_only_pnl_charts() {
        let dir = tempdir().unwrap();
        let trades: Vec<_> = [5.0, -2.0, 0.0]
            .iter()
            .map(|pnl| json!({ "net_pnl": pnl }))
            .collect();
        let log = write_json_log(dir.path(), &trades);
        let sink = RecordingChartSink::new();
        let config = config_for(log, dir.path().join("charts"));

        run_report_pipeline(&JsonLogAdapter::new(), &sink, &config).unwrap();

        // No exit times: the scatter chart drops out along with the equity kinds.
        assert_eq!(
            sink.saved_stems(),
            vec!["backtest_pnl_per_trade", "backtest_pnl_distribution"]
        );
    }
}
