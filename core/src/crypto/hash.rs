//! # Hashing Utilities
//!
//! Thin wrappers over `sha2::Sha256`. Block hashes are stored and compared
//! as hex strings, so the hex variant is what most callers want.

use sha2::{Digest, Sha256};

use crate::config::HASH_OUTPUT_LENGTH;

/// Compute the SHA-256 digest of `data` as a fixed-size array.
///
/// # Example
///
/// ```
/// use statchain_core::crypto::sha256;
///
/// let digest = sha256(b"statchain");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; HASH_OUTPUT_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the SHA-256 digest of `data` and return it as lowercase hex.
///
/// This is the representation used for `Block::hash` and
/// `Block::prev_hash`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
