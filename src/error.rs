//! Error types module.
//!
//! This module defines the error types used throughout dnsrank.
//! It uses `thiserror` for structured error handling and provides
//! a custom `Result` type alias for convenience.
//!
//! Probe failures are deliberately absent here: a failed or timed-out
//! probe attempt is data (see [`crate::probe::ProbeFailure`]), not an error.

use thiserror::Error;

/// A specialized `Result` type for dnsrank operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for dnsrank.
///
/// Each variant represents a category of error that aborts an operation
/// as a whole.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations, stdout, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (endpoint lists, config files, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// DNS resolver construction error
    #[error("DNS resolver error: {0}")]
    Resolver(#[from] trust_dns_resolver::error::ResolveError),

    /// Network-related error (probe client could not be created)
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error (invalid settings, missing files)
    #[error("Config error: {0}")]
    Config(String),

    /// Parse error (invalid input format, malformed data)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The run could not admit or schedule its probe tasks.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
}

impl Error {
    /// Create a new network error with a message.
    #[must_use]
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new resource exhaustion error with a message.
    #[must_use]
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Whether this error is a systemic scheduling failure.
    #[must_use]
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::config("concurrency must be at least 1").to_string(),
            "Config error: concurrency must be at least 1"
        );
        assert_eq!(
            Error::resource_exhausted("admission gate closed").to_string(),
            "Resource exhausted: admission gate closed"
        );
    }

    #[test]
    fn test_is_resource_exhausted() {
        assert!(Error::resource_exhausted("x").is_resource_exhausted());
        assert!(!Error::config("x").is_resource_exhausted());
        assert!(!Error::network("x").is_resource_exhausted());
    }
}
