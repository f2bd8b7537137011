//! dbemu store - everything that touches the network or the filesystem
//!
//! Provides:
//! - Connection configuration from the environment and `.env`
//! - A Neo4j provider speaking the HTTP transactional endpoint
//! - Atomic persistence of snapshots and loading them back

pub mod atomic;
pub mod config;
pub mod db;
pub mod errors;
pub mod snapshot;

// Re-export key types
pub use config::{ConfigError, ConnectionConfig};
pub use db::Neo4jHttpProvider;
pub use errors::Result;
pub use snapshot::{load_snapshot, save_snapshot, SaveReport};
