//! Content digests for persisted snapshots
//!
//! Two runs against an unchanged database must produce byte-identical
//! files; comparing digests is how that is checked and reported.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA256 of `bytes` (64 characters)
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
