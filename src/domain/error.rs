//! Domain error types.

/// Top-level error type for tradegraph.
#[derive(Debug, thiserror::Error)]
pub enum TradegraphError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("trade log error in {file}: {reason}")]
    LogParse { file: String, reason: String },

    #[error("chart render error for {chart}: {reason}")]
    ChartRender { chart: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradegraphError> for std::process::ExitCode {
    fn from(err: &TradegraphError) -> Self {
        let code: u8 = match err {
            TradegraphError::Io(_) => 1,
            TradegraphError::ConfigParse { .. } => 2,
            TradegraphError::LogParse { .. } => 3,
            TradegraphError::ChartRender { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
