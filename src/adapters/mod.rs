//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod json_log_adapter;
pub mod csv_log_adapter;
pub mod svg_chart;
