//! Error types for the weather cache client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Fetch Error ==
/// Failure of a single upstream fetch.
///
/// Transport errors, non-success statuses and malformed payloads all map to
/// this one kind, carrying a diagnostic message and the underlying cause.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct FetchError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    /// Creates a fetch error without an underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a fetch error wrapping its cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// == Client Error Enum ==
/// Unified error type for the caching client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Upstream fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Operation attempted after the client was closed
    #[error("Client is closed")]
    Closed,

    /// A client is already registered for this credential
    #[error("Client already registered for credential {0}")]
    DuplicateClient(String),

    /// Invalid capacity, TTL, interval or credential
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

// == Result Type Alias ==
/// Convenience Result type for the caching client.
pub type Result<T> = std::result::Result<T, ClientError>;
