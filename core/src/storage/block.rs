//! # Block Structure
//!
//! A block is the only record StatChain knows about. It holds a batch of
//! samples, the hash of the block before it, its own hash, and summary
//! statistics over the samples.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  index: i64          (-1 for genesis)        │
//! │  timestamp: DateTime<Utc>                    │
//! │  data: Vec<f64>      (empty for genesis)     │
//! │  prev_hash: String   (empty for genesis)     │
//! │  hash: String        (SHA-256, hex)          │
//! │  stats: Option<Summary>                      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! The hash covers `index | timestamp | data | prev_hash` rendered as text:
//!
//! ```text
//! 3|2026-10-19T17:04:05.123456789Z|[0.25 0.5 0.75]|9f86d081...
//! ```
//!
//! - `index` is written in decimal.
//! - `timestamp` is RFC 3339 in UTC with nanosecond precision.
//! - each sample uses the shortest representation that round-trips, so two
//!   different values never print the same.
//!
//! The statistics are NOT hashed. They are derived from `data`, which is.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{GENESIS_INDEX, PREIMAGE_SEPARATOR};
use crate::crypto::hash::sha256_hex;
use crate::stats::Summary;

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A single record in the chain.
///
/// Blocks are built once by [`Block::genesis`] or [`Block::generate`] and
/// never modified afterwards. Fields are public for reporting and tests;
/// changing one breaks the hash, which is exactly what the validator
/// checks for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain. Genesis is [`GENESIS_INDEX`].
    pub index: i64,
    /// Wall-clock time at construction.
    pub timestamp: DateTime<Utc>,
    /// Sample payload. Empty for genesis.
    pub data: Vec<f64>,
    /// Hash of the predecessor. Empty for genesis.
    pub prev_hash: String,
    /// Hash of this block's own fields.
    pub hash: String,
    /// Statistics over `data`. `None` when `data` is empty.
    pub stats: Option<Summary>,
}

impl Block {
    /// Construct the genesis block.
    ///
    /// The genesis block has the sentinel index, no samples, no
    /// predecessor and no statistics. Its hash is computed like any other.
    pub fn genesis(timestamp: DateTime<Utc>) -> Self {
        let data = Vec::new();
        let prev_hash = String::new();
        let hash = compute_block_hash(GENESIS_INDEX, &timestamp, &data, &prev_hash);

        Block {
            index: GENESIS_INDEX,
            timestamp,
            data,
            prev_hash,
            hash,
            stats: None,
        }
    }

    /// Construct a new block on top of `predecessor`, stamped with the
    /// current time.
    pub fn generate(predecessor: &Block, data: Vec<f64>) -> Self {
        Self::generate_at(predecessor, data, Utc::now())
    }

    /// Construct a new block on top of `predecessor` with an explicit
    /// timestamp.
    ///
    /// The index is one past the predecessor's (so genesis at `-1` yields
    /// `0`), the hash is computed over the new fields, and statistics are
    /// filled in when the payload is non-empty.
    pub fn generate_at(predecessor: &Block, data: Vec<f64>, timestamp: DateTime<Utc>) -> Self {
        let index = predecessor.index + 1;
        let prev_hash = predecessor.hash.clone();
        let hash = compute_block_hash(index, &timestamp, &data, &prev_hash);
        let stats = Summary::compute(&data);

        debug!(index, samples = data.len(), hash = %hash, "block generated");

        Block {
            index,
            timestamp,
            data,
            prev_hash,
            hash,
            stats,
        }
    }

    /// Recompute the hash from this block's fields.
    ///
    /// Compare against `self.hash` to detect tampering.
    pub fn compute_hash(&self) -> String {
        compute_block_hash(self.index, &self.timestamp, &self.data, &self.prev_hash)
    }

    /// Whether this block sits at the genesis position.
    pub fn is_genesis(&self) -> bool {
        self.index == GENESIS_INDEX
    }

    /// Mean of the payload, if any.
    pub fn mean(&self) -> Option<f64> {
        self.stats.map(|s| s.mean)
    }

    /// Median of the payload, if any.
    pub fn median(&self) -> Option<f64> {
        self.stats.map(|s| s.median)
    }

    /// Spread (2 × population std-dev) of the payload, if any.
    pub fn spread(&self) -> Option<f64> {
        self.stats.map(|s| s.spread)
    }
}

// ---------------------------------------------------------------------------
// Hash Computation
// ---------------------------------------------------------------------------

/// Render a timestamp the way it enters the hash preimage.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Render a sample payload as `[a b c]`.
pub fn format_data(data: &[f64]) -> String {
    let items: Vec<String> = data.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(" "))
}

/// Build the canonical text preimage for a block's identity fields.
pub fn canonical_preimage(
    index: i64,
    timestamp: &DateTime<Utc>,
    data: &[f64],
    prev_hash: &str,
) -> String {
    let sep = PREIMAGE_SEPARATOR;
    format!(
        "{index}{sep}{}{sep}{}{sep}{prev_hash}",
        format_timestamp(timestamp),
        format_data(data),
    )
}

/// Compute the hex SHA-256 hash of a block from its identity fields.
pub fn compute_block_hash(
    index: i64,
    timestamp: &DateTime<Utc>,
    data: &[f64],
    prev_hash: &str,
) -> String {
    sha256_hex(canonical_preimage(index, timestamp, data, prev_hash).as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
