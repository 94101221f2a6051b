//! Chart persistence port trait.

use std::path::Path;

use crate::domain::chart::Chart;
use crate::domain::error::TradegraphError;

/// Port for turning a backend-neutral [`Chart`] into an artifact on disk.
///
/// Implementations overwrite existing artifacts and create parent
/// directories as needed; only genuine I/O failure is an error.
pub trait ChartSink {
    fn save(&self, chart: &Chart, path: &Path) -> Result<(), TradegraphError>;
}
