//! Domain error types
//!
//! Defines the error hierarchy for ocexport. All errors are domain-specific
//! and don't expose third-party types.

use thiserror::Error;

/// Main ocexport error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// OrderCloud API errors
    #[error("OrderCloud error: {0}")]
    OrderCloud(#[from] OrderCloudError),

    /// Source snapshot/lookup errors
    #[error("Source error: {0}")]
    Source(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// OrderCloud-specific errors
///
/// Errors that occur when interacting with the OrderCloud API. The
/// `NotFound` variant is load-bearing: every mapper's get-or-create path
/// treats it as the expected signal to proceed to creation, while all
/// other variants are genuine failures.
#[derive(Debug, Error)]
pub enum OrderCloudError {
    /// Resource does not exist (HTTP 404) - expected on the create path
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authentication or authorization failed (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// API rejected the request or failed server-side
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Failed to deserialize response: {0}")]
    Deserialization(String),

    /// Client construction/configuration failure
    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

impl OrderCloudError {
    /// Whether this error is the expected "does not exist yet" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderCloudError::NotFound(_))
    }
}

impl ExportError {
    /// Whether this error is an OrderCloud "does not exist yet" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExportError::OrderCloud(e) if e.is_not_found())
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Configuration(format!("TOML parse error: {err}"))
    }
}
