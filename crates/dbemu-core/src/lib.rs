//! dbemu core - offline snapshot of a graph database's per-entity read API
//!
//! This crate holds everything that does not touch the network or the
//! filesystem:
//! - the canonical error facility and logging facility
//! - the snapshot data model (property values, entries, the keyed snapshot)
//! - the `ConnectionProvider` / `GraphSession` seam
//! - the build pipeline: enumerate, fetch, assemble

pub mod digest;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod target;

pub use dbemu_core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, PipelineError, Result};
pub use model::{
    EntityId, EntityRecord, EntitySnapshot, ListedId, Relationship, Snapshot, Summary,
};
pub use pipeline::{BuildOutcome, CancelFlag, SnapshotAssembler};
pub use session::{ConnectionProvider, GraphSession, Query, Row};
pub use target::EntityTarget;
