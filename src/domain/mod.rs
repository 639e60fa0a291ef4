//! Core domain types and models

pub mod entities;
pub mod errors;
pub mod ids;
pub mod result;
pub mod variations;

pub use errors::{ExportError, OrderCloudError};
pub use result::Result;
