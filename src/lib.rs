//! tradegraph: chart generation for completed backtest trade logs.
//!
//! Hexagonal architecture: derivation logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;

pub mod cli;
