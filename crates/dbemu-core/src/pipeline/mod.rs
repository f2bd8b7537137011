//! Snapshot-build pipeline
//!
//! ```text
//! ConnectionProvider → list_ids → (per id) fetch_entity → SnapshotAssembler
//! ```
//!
//! Strictly sequential: each fetch completes, successfully or as an
//! error-shaped entry, before the next one starts.

pub mod assembler;
pub mod cancel;
pub mod enumerator;
pub mod fetcher;
pub mod observer;

pub use assembler::{BuildOutcome, PartialBuild, SnapshotAssembler};
pub use cancel::CancelFlag;
pub use enumerator::list_ids;
pub use fetcher::fetch_entity;
pub use observer::{BuildObserver, NoopObserver};
