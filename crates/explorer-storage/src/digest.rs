//! Content hashing for version records.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
