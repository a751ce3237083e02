//! Domain error types.

/// Top-level error type for papertrade.
#[derive(Debug, thiserror::Error)]
pub enum PapertradeError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

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

    #[error("{reason}")]
    Validation { reason: String },

    #[error("unknown symbol: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("not enough cash: need ${needed:.2}, have ${available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("not enough shares of {symbol}: selling {requested}, holding {held}")]
    InsufficientShares {
        symbol: String,
        requested: i64,
        held: i64,
    },

    #[error("username {username} is already taken")]
    DuplicateUsername { username: String },

    #[error("invalid username or password")]
    AuthenticationFailed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PapertradeError> for std::process::ExitCode {
    fn from(err: &PapertradeError) -> Self {
        let code: u8 = match err {
            PapertradeError::Io(_) => 1,
            PapertradeError::ConfigParse { .. }
            | PapertradeError::ConfigMissing { .. }
            | PapertradeError::ConfigInvalid { .. } => 2,
            PapertradeError::Database { .. } | PapertradeError::DatabaseQuery { .. } => 3,
            PapertradeError::Validation { .. }
            | PapertradeError::SymbolNotFound { .. }
            | PapertradeError::InsufficientFunds { .. }
            | PapertradeError::InsufficientShares { .. } => 4,
            PapertradeError::DuplicateUsername { .. }
            | PapertradeError::AuthenticationFailed => 5,
        };
        std::process::ExitCode::from(code)
    }
}
