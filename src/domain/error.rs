//! Domain error types.

/// A rejected trade. Never fatal: the ledger is left untouched and the caller
/// surfaces the error as a user-visible notice.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeError {
    #[error("insufficient funds: order costs {cost:.2} but only {cash:.2} in cash")]
    InsufficientFunds { cost: f64, cash: f64 },

    #[error("insufficient holdings: tried to sell {requested} shares but only {held} held")]
    InsufficientHoldings { requested: u64, held: u64 },
}

/// Top-level error type for stocksim.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn missing(section: &str, key: &str) -> Self {
        SimError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SimError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SimError> for std::process::ExitCode {
    fn from(err: &SimError) -> Self {
        let code: u8 = match err {
            SimError::Io(_) => 1,
            SimError::ConfigParse { .. }
            | SimError::ConfigMissing { .. }
            | SimError::ConfigInvalid { .. } => 2,
            SimError::Data { .. } => 3,
            SimError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
