//! CSV trade-log adapter.
//!
//! Headered CSV with the same column names as the JSON artifact. Empty
//! cells and unparsable values load as absent; a structurally broken file
//! (unreadable, bad header row, ragged records) is an error.

use std::fs;
use std::path::Path;

use crate::domain::error::TradegraphError;
use crate::domain::trade::{Direction, TradeRecord, parse_timestamp};
use crate::ports::trade_log_port::TradeLogPort;

pub struct CsvLogAdapter;

impl CsvLogAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvLogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

struct ColumnMap {
    entry_time: Option<usize>,
    exit_time: Option<usize>,
    mid_price_entry: Option<usize>,
    mid_price_exit: Option<usize>,
    position_size: Option<usize>,
    direction: Option<usize>,
    slippage_entry: Option<usize>,
    slippage_exit: Option<usize>,
    capital_after_exit: Option<usize>,
    net_pnl: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        ColumnMap {
            entry_time: find("entry_time"),
            exit_time: find("exit_time"),
            mid_price_entry: find("mid_price_entry"),
            mid_price_exit: find("mid_price_exit"),
            position_size: find("position_size"),
            direction: find("direction"),
            slippage_entry: find("slippage_entry"),
            slippage_exit: find("slippage_exit"),
            capital_after_exit: find("capital_after_exit"),
            net_pnl: find("net_pnl"),
        }
    }
}

fn cell<'a>(record: &'a csv::StringRecord, idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn cell_f64(record: &csv::StringRecord, idx: Option<usize>) -> Option<f64> {
    // str::parse accepts "NaN"/"inf"; those would poison the derived
    // series and SVG coordinates, so they load as absent too.
    cell(record, idx)
        .and_then(|s| s.parse().ok())
        .filter(|v: &f64| v.is_finite())
}

impl TradeLogPort for CsvLogAdapter {
    fn load_trades(&self, path: &Path) -> Result<Vec<TradeRecord>, TradegraphError> {
        let content = fs::read_to_string(path).map_err(|e| TradegraphError::LogParse {
            file: path.display().to_string(),
            reason: format!("failed to read: {e}"),
        })?;

        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let columns = ColumnMap::from_headers(reader.headers().map_err(|e| {
            TradegraphError::LogParse {
                file: path.display().to_string(),
                reason: format!("bad header row: {e}"),
            }
        })?);

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|e| TradegraphError::LogParse {
                file: path.display().to_string(),
                reason: format!("CSV parse error: {e}"),
            })?;

            records.push(TradeRecord {
                entry_time: cell(&row, columns.entry_time).and_then(parse_timestamp),
                exit_time: cell(&row, columns.exit_time).and_then(parse_timestamp),
                mid_price_entry: cell_f64(&row, columns.mid_price_entry),
                mid_price_exit: cell_f64(&row, columns.mid_price_exit),
                position_size: cell_f64(&row, columns.position_size),
                direction: cell(&row, columns.direction).and_then(Direction::parse),
                slippage_entry: cell_f64(&row, columns.slippage_entry),
                slippage_exit: cell_f64(&row, columns.slippage_exit),
                capital_after_exit: cell_f64(&row, columns.capital_after_exit),
                net_pnl: cell_f64(&row, columns.net_pnl),
            });
        }

        Ok(records)
    }
}
