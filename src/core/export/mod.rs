//! Export stages and orchestration
//!
//! One module per entity kind, each following the get-or-create pattern,
//! plus the orchestrator that runs them in dependency order. Stages signal
//! control flow with [`Abort`]: an `Info` abort means "this entity is
//! handled, move on" (already counted, not published, already up to date);
//! an `Error` abort stops the parent stage.

pub mod buyers;
pub mod buyers_extended;
pub mod catalog_assignments;
pub mod catalogs;
pub mod categories;
pub mod category_assignments;
pub mod customers;
pub mod orchestrator;
pub mod products;

pub use orchestrator::Orchestrator;

/// How far an abort propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Entity-scoped: the entity is accounted for, siblings proceed
    Info,
    /// Stage-scoped: the parent stage cannot meaningfully continue
    Error,
}

/// An early exit from a per-entity sub-run.
#[derive(Debug, Clone)]
pub struct Abort {
    pub severity: Severity,
    pub message: String,
}

impl Abort {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Result of one per-entity sub-run.
pub type StepResult<T> = std::result::Result<T, Abort>;

/// Runs one entity sub-step, letting Info aborts pass and propagating
/// Error aborts to the caller.
pub(crate) fn absorb_info(step: StepResult<()>) -> StepResult<()> {
    match step {
        Ok(()) => Ok(()),
        Err(abort) if abort.is_error() => Err(abort),
        Err(abort) => {
            tracing::debug!(reason = %abort.message, "Entity sub-run ended early");
            Ok(())
        }
    }
}
