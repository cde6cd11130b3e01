//! Error types for capture operations

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, RetraceError>;

/// Error types for the capture engine
#[derive(Debug, thiserror::Error)]
pub enum RetraceError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// DSN could not be parsed
    #[error("Invalid DSN: {0}")]
    Dsn(String),

    /// Recorder failed to start or stop
    #[error("Recorder error: {0}")]
    Recorder(String),

    /// Transport delivery failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Collector request failed
    #[error("Collector error: {0}")]
    Collector(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for RetraceError {
    fn from(s: String) -> Self {
        RetraceError::Other(s)
    }
}

impl From<&str> for RetraceError {
    fn from(s: &str) -> Self {
        RetraceError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for RetraceError {
    fn from(err: anyhow::Error) -> Self {
        RetraceError::Other(err.to_string())
    }
}
