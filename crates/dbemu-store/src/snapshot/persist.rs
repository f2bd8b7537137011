//! Snapshot persistence operations.

use crate::atomic::atomic_write;
use crate::errors::{persistence_error, Result};
use dbemu_core::digest::sha256_hex;
use dbemu_core::errors::{ExError, ExErrorKind};
use dbemu_core::model::Snapshot;
use dbemu_core::{log_op_end, log_op_error, log_op_start};
use std::path::{Path, PathBuf};
use std::time::Instant;

const OP: &str = "save_snapshot";

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    /// Size of the written file
    pub size_bytes: u64,
    /// SHA-256 of the written bytes (hex-encoded, 64 characters)
    pub digest: String,
    pub entries: usize,
}

/// Serialize a snapshot exactly as it is written to disk
///
/// Two-space indentation, non-ASCII characters kept as-is, entries in
/// ascending identifier order, no trailing newline. Identical snapshots
/// always render to identical bytes.
///
/// ## Errors
///
/// - `ExErrorKind::Serialization`: JSON serialization failed
pub fn render_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(snapshot).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op(OP)
            .with_message(format!("Failed to serialize snapshot: {}", e))
    })
}

/// Write a snapshot to `path`, replacing any previous file
///
/// Parent directories are created. The write goes through a temp file and a
/// rename, so a failure never leaves a partial file behind.
///
/// ## Errors
///
/// - `ExErrorKind::Serialization`: JSON serialization failed
/// - `ExErrorKind::Persistence`: the file could not be written (the I/O
///   error is attached as the source)
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<SaveReport> {
    let start = Instant::now();
    log_op_start!(OP, path = %path.display(), entries = snapshot.len());

    let result = write_snapshot(snapshot, path);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(report) => {
            log_op_end!(
                OP,
                duration_ms = duration_ms,
                size_bytes = report.size_bytes,
                digest = report.digest.as_str()
            );
        }
        Err(err) => {
            log_op_error!(OP, err, duration_ms = duration_ms);
        }
    }
    result
}

fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<SaveReport> {
    let bytes = render_snapshot(snapshot)?;
    atomic_write(path, &bytes).map_err(|e| persistence_error(OP, path, e))?;

    Ok(SaveReport {
        path: path.to_path_buf(),
        size_bytes: bytes.len() as u64,
        digest: sha256_hex(&bytes),
        entries: snapshot.len(),
    })
}
