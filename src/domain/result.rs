//! Result type alias for ocexport

use crate::domain::errors::ExportError;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, ExportError>;
