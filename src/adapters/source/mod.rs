//! Source platform adapter

pub mod snapshot;
pub mod traits;

pub use snapshot::{SnapshotDocument, SnapshotStore};
pub use traits::SourceStore;
