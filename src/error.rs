//! Error types for Contrail.

use thiserror::Error;

/// Library-level error type for Contrail operations.
#[derive(Error, Debug)]
pub enum ContrailError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input not found: {0}")]
    InputMissing(String),

    #[error("{message}\nUsage: {usage}")]
    BadArgument { message: String, usage: String },

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Vector store rejected the request: {0}")]
    StoreRejected(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl ContrailError {
    /// Build a bad-argument error carrying the command's usage line.
    pub fn bad_argument(message: impl Into<String>, usage: impl Into<String>) -> Self {
        ContrailError::BadArgument {
            message: message.into(),
            usage: usage.into(),
        }
    }

    /// Process exit status for this error.
    ///
    /// Every failure the CLI reports (bad arguments, missing input, store or
    /// model failures) exits with status 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type alias for Contrail operations.
pub type Result<T> = std::result::Result<T, ContrailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_argument_includes_usage() {
        let err = ContrailError::bad_argument("Invalid number format.", "contrail ingest [number]");
        let msg = err.to_string();
        assert!(msg.contains("Invalid number format."));
        assert!(msg.contains("Usage: contrail ingest [number]"));
        assert_eq!(err.exit_code(), 1);
    }
}
