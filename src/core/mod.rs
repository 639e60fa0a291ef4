//! Core export logic

pub mod context;
pub mod export;
pub mod result;

pub use context::RunContext;
pub use export::Orchestrator;
pub use result::{ExportCounters, ExportResult, ProblemObjects};
