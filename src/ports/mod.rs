//! Port traits for external collaborators.

pub mod config_port;
pub mod trade_log_port;
pub mod chart_sink;
