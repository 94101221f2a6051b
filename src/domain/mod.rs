//! Core domain types and derivation logic.

pub mod trade;
pub mod series;
pub mod chart;
pub mod report;
pub mod error;
