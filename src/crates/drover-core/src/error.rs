//! Error types for the export pipeline
//!
//! Provides a unified error type shared by the controller, the sink writer,
//! and the collaborator adapters.

use std::fmt;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for export operations
#[derive(Debug)]
pub enum ExportError {
    /// Configuration error
    Config(String),

    /// Fatal source error (connectivity or query failure); never retried
    Source(anyhow::Error),

    /// Sink transport error surfaced outside the retry loop
    Sink(anyhow::Error),

    /// The run was cancelled by a stop request
    Cancelled,

    /// IO error
    Io(std::io::Error),

    /// Serialization/deserialization error
    Serde(serde_json::Error),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Source(err) => write!(f, "Source error: {}", err),
            Self::Sink(err) => write!(f, "Sink error: {}", err),
            Self::Cancelled => write!(f, "Export cancelled by stop request"),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Serde(err) => write!(f, "Serialization error: {}", err),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(err) | Self::Sink(err) => Some(err.as_ref()),
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
            _ => None,
        }
    }
}

// Conversions from common error types
impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err)
    }
}

impl From<String> for ExportError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for ExportError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}
