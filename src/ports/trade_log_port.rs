//! Trade-log loading port trait.

use std::path::Path;

use crate::domain::error::TradegraphError;
use crate::domain::trade::TradeRecord;

/// Port for reading a completed trade log.
///
/// Adapters return the records in file order; the pipeline owns the one
/// exit-time sort. An unreadable or structurally malformed artifact is an
/// error. A missing artifact and an empty `trades` collection are handled
/// by the caller as soft no-ops, not by the adapter.
pub trait TradeLogPort {
    fn load_trades(&self, path: &Path) -> Result<Vec<TradeRecord>, TradegraphError>;
}
