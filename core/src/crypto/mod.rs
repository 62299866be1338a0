//! # Cryptographic Primitives
//!
//! StatChain needs exactly one primitive: a collision-resistant hash to bind
//! each block to its predecessor. We use SHA-256 from the `sha2` crate and
//! render digests as lowercase hex.
//!
//! Nothing here is signed or encrypted. Tamper-evidence comes from the hash
//! chain alone.

pub mod hash;

pub use hash::{sha256, sha256_hex};
