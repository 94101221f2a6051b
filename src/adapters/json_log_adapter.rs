//! JSON trade-log adapter.
//!
//! The artifact is a JSON object with a `trades` array. The object as a
//! whole must parse; individual trade fields are tolerated field-by-field,
//! so a missing, null or mistyped field simply loads as absent.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::error::TradegraphError;
use crate::domain::trade::{Direction, TradeRecord, parse_timestamp};
use crate::ports::trade_log_port::TradeLogPort;

#[derive(Deserialize)]
struct RawLog {
    #[serde(default)]
    trades: Vec<Value>,
}

pub struct JsonLogAdapter;

impl JsonLogAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonLogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeLogPort for JsonLogAdapter {
    fn load_trades(&self, path: &Path) -> Result<Vec<TradeRecord>, TradegraphError> {
        let content = fs::read_to_string(path).map_err(|e| TradegraphError::LogParse {
            file: path.display().to_string(),
            reason: format!("failed to read: {e}"),
        })?;

        let log: RawLog =
            serde_json::from_str(&content).map_err(|e| TradegraphError::LogParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(log.trades.iter().map(trade_from_value).collect())
    }
}

fn trade_from_value(value: &Value) -> TradeRecord {
    TradeRecord {
        entry_time: field_timestamp(value, "entry_time"),
        exit_time: field_timestamp(value, "exit_time"),
        mid_price_entry: field_f64(value, "mid_price_entry"),
        mid_price_exit: field_f64(value, "mid_price_exit"),
        position_size: field_f64(value, "position_size"),
        direction: value
            .get("direction")
            .and_then(Value::as_str)
            .and_then(Direction::parse),
        slippage_entry: field_f64(value, "slippage_entry"),
        slippage_exit: field_f64(value, "slippage_exit"),
        capital_after_exit: field_f64(value, "capital_after_exit"),
        net_pnl: field_f64(value, "net_pnl"),
    }
}

fn field_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn field_timestamp(value: &Value, key: &str) -> Option<chrono::NaiveDateTime> {
    value.get(key).and_then(Value::as_str).and_then(parse_timestamp)
}
