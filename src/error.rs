/// Harness-wide error type. Every fallible function returns `Result<T, HarnessError>`.
///
/// Two classes matter for the exit code: `Configuration` errors are fatal and
/// abort before any generation call; everything else is recovered at the
/// granularity described by the module that raises it (a provider fault fails
/// one test record, not the suite).
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl HarnessError {
    /// Short machine-readable tag for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::Configuration(_) => "configuration",
            HarnessError::Provider(_) => "provider",
            HarnessError::Store(_) => "store",
            HarnessError::Io(_) => "io",
            HarnessError::Serde(_) => "serde",
        }
    }

    /// True for errors that must abort the process before any generation call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HarnessError::Configuration(_))
    }
}

/// Convert any displayable error into `HarnessError::Provider`.
pub fn provider_err(e: impl std::fmt::Display) -> HarnessError {
    HarnessError::Provider(e.to_string())
}
