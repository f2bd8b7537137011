//! Atomic write primitives
//!
//! Uses temp→rename so readers only ever see the old file or the new one

use crate::errors::{io_error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, replacing any existing content
///
/// The temp file lives next to the target so the rename never crosses a
/// filesystem. On failure the temp file is removed and the target is left
/// untouched.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = target_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create_output_dir", e))?;
        }
    }

    let temp_path = temp_path_for(target_path);
    let result = write_then_rename(&temp_path, target_path, content);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_then_rename(temp_path: &Path, target_path: &Path, content: &[u8]) -> Result<()> {
    let mut file = fs::File::create(temp_path).map_err(|e| io_error("create_temp", e))?;
    file.write_all(content)
        .map_err(|e| io_error("write_temp", e))?;
    file.sync_all().map_err(|e| io_error("sync_temp", e))?;
    drop(file);

    fs::rename(temp_path, target_path).map_err(|e| io_error("rename_temp", e))
}

/// `out/db.json` → `out/.db.json.tmp`
fn temp_path_for(target_path: &Path) -> PathBuf {
    let name = target_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target_path.with_file_name(format!(".{}.tmp", name))
}
