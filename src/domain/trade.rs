//! Completed trade records and their ordering.

use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// Side of a completed trade. Anything other than LONG/SHORT in the source
/// artifact is treated as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn parse(raw: &str) -> Option<Direction> {
        match raw.trim().to_uppercase().as_str() {
            "LONG" => Some(Direction::Long),
            "SHORT" => Some(Direction::Short),
            _ => None,
        }
    }
}

/// Sign convention used throughout the derivation logic: +1 for long,
/// -1 for short, 0 when the direction is unknown.
pub fn direction_sign(direction: Option<Direction>) -> f64 {
    match direction {
        Some(Direction::Long) => 1.0,
        Some(Direction::Short) => -1.0,
        None => 0.0,
    }
}

/// One completed trade as loaded from the trade-log artifact.
///
/// Every field is optional: the log format tolerates absent or malformed
/// values field-by-field. Records are immutable once loaded; the only
/// mutation the pipeline performs is the one [`sort_by_exit_time`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeRecord {
    pub entry_time: Option<NaiveDateTime>,
    pub exit_time: Option<NaiveDateTime>,
    pub mid_price_entry: Option<f64>,
    pub mid_price_exit: Option<f64>,
    pub position_size: Option<f64>,
    pub direction: Option<Direction>,
    pub slippage_entry: Option<f64>,
    pub slippage_exit: Option<f64>,
    pub capital_after_exit: Option<f64>,
    pub net_pnl: Option<f64>,
}

impl TradeRecord {
    /// Slippage defaults to zero where the log omits it.
    pub fn slippage_entry_or_zero(&self) -> f64 {
        self.slippage_entry.unwrap_or(0.0)
    }

    pub fn slippage_exit_or_zero(&self) -> f64 {
        self.slippage_exit.unwrap_or(0.0)
    }

    pub fn sign(&self) -> f64 {
        direction_sign(self.direction)
    }
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d",
];

/// Lenient timestamp parsing: unparsable values become missing, never an
/// error. Accepts ISO 8601 with or without fractional seconds or offset,
/// and bare dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in TIMESTAMP_FORMATS {
        if format.ends_with("%:z") {
            if let Ok(dt) = chrono::DateTime::parse_from_str(raw, format) {
                return Some(dt.naive_utc());
            }
        } else if format == "%Y-%m-%d" {
            if let Ok(d) = chrono::NaiveDate::parse_from_str(raw, format) {
                return d.and_hms_opt(0, 0, 0);
            }
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    None
}

/// Stable sort ascending by exit time. Records without an exit time sort
/// after all timestamped records and keep their relative order. Every
/// time-indexed series downstream follows this ordering.
pub fn sort_by_exit_time(records: &mut [TradeRecord]) {
    records.sort_by(|a, b| match (a.exit_time, b.exit_time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
