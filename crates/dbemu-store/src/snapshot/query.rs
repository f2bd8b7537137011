//! Reading persisted snapshots back

use crate::errors::{invalid_snapshot, io_error, Result};
use dbemu_core::errors::ExError;
use dbemu_core::model::{EntityId, EntitySnapshot, Snapshot};
use dbemu_core::target::EntityTarget;
use std::path::Path;

/// Load a snapshot file written by `save_snapshot`
///
/// ## Errors
///
/// - `ExErrorKind::Io`: the file cannot be read
/// - `ExErrorKind::InvalidSnapshot`: the content is not a snapshot, or an
///   entry mixes the success and failure shapes
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = std::fs::read(path).map_err(|e| io_error("read_snapshot", e))?;
    let snapshot: Snapshot =
        serde_json::from_slice(&bytes).map_err(|e| invalid_snapshot(path, e))?;

    tracing::debug!(path = %path.display(), entries = snapshot.len(), "Loaded snapshot");
    Ok(snapshot)
}

/// Serve one entry the way the live per-entity endpoint would
///
/// ## Errors
///
/// - `ExErrorKind::NotFound`: `id` is not a key of the snapshot; the message
///   is `"<Label> not found"`
pub fn get_entry<'a>(
    snapshot: &'a Snapshot,
    target: &EntityTarget,
    id: &EntityId,
) -> Result<&'a EntitySnapshot> {
    snapshot
        .get(id)
        .ok_or_else(|| ExError::from(target.not_found(id)).with_op("get_entry"))
}
