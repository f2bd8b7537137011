//! Snapshot persistence layer.
//!
//! ## Responsibilities
//!
//! - Serialize a completed snapshot as pretty-printed UTF-8 JSON
//! - Write it atomically, reporting size and SHA-256 digest
//! - Load a persisted snapshot back and serve single entries
//!
//! ## Non-Responsibilities
//!
//! - Building the snapshot (handled by `dbemu-core`)
//! - Deciding whether to persist at all (handled by the CLI)

pub mod persist;
pub mod query;

// Re-export primary types
pub use persist::{render_snapshot, save_snapshot, SaveReport};
pub use query::{get_entry, load_snapshot};
