//! Domain error types.

/// Top-level error type for masweep.
#[derive(Debug, thiserror::Error)]
pub enum MasweepError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config: {reason}")]
    ConfigInvalid { reason: String },

    #[error("invalid variant: {reason}")]
    VariantInvalid { reason: String },

    #[error("simulation session error for {symbol}: {reason}")]
    Session { symbol: String, reason: String },

    #[error("no bar data for {symbol}")]
    NoData { symbol: String },

    #[error("checkpoint write error: {reason}")]
    Checkpoint { reason: String },

    #[error("report write error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MasweepError> for std::process::ExitCode {
    fn from(err: &MasweepError) -> Self {
        let code: u8 = match err {
            MasweepError::Io(_) => 1,
            MasweepError::ConfigParse { .. }
            | MasweepError::ConfigInvalid { .. }
            | MasweepError::VariantInvalid { .. } => 2,
            MasweepError::Session { .. } | MasweepError::NoData { .. } => 3,
            MasweepError::Checkpoint { .. } | MasweepError::Report { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
