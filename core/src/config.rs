//! # Chain Configuration & Constants
//!
//! Every tunable number lives here. The defaults reproduce the classic
//! demo run: ten blocks of ten uniform samples in `[0.0, 1.0]`.
//!
//! `ChainConfig` is the runtime view of these constants. The CLI builds one
//! from flags and environment variables; tests build them by hand.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Chain Shape
// ---------------------------------------------------------------------------

/// Index of the genesis block. Real blocks start at 0, so the genesis
/// block sits one step before the first of them.
pub const GENESIS_INDEX: i64 = -1;

/// Number of growth iterations after genesis.
pub const DEFAULT_BLOCK_COUNT: usize = 10;

/// Number of samples drawn for each block's payload.
pub const DEFAULT_SAMPLES_PER_BLOCK: usize = 10;

// ---------------------------------------------------------------------------
// Sample Domain
// ---------------------------------------------------------------------------

/// Lower bound (inclusive) of an accepted sample.
pub const DEFAULT_DOMAIN_MIN: f64 = 0.0;

/// Upper bound (inclusive) of an accepted sample.
pub const DEFAULT_DOMAIN_MAX: f64 = 1.0;

// ---------------------------------------------------------------------------
// Hashing & Reporting
// ---------------------------------------------------------------------------

/// SHA-256 digest length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Length of a hex-encoded block hash. Two characters per byte.
pub const HASH_HEX_LENGTH: usize = HASH_OUTPUT_LENGTH * 2;

/// Field separator inside the hash preimage.
pub const PREIMAGE_SEPARATOR: char = '|';

/// Line printed between blocks in the text report.
pub const REPORT_SEPARATOR: &str = "------------------";

/// Diagnostic printed when a freshly generated block fails validation.
pub const INVALID_BLOCK_MESSAGE: &str = "Invalid block detected. Skipping...";

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Errors raised by [`ChainConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A block without samples has no statistics to summarise.
    #[error("samples_per_block must be at least 1")]
    NoSamples,

    /// One of the domain bounds is NaN or infinite.
    #[error("domain bounds must be finite: [{min}, {max}]")]
    NonFiniteDomain {
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },

    /// The lower bound is above the upper bound.
    #[error("domain is inverted: min {min} > max {max}")]
    InvertedDomain {
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },
}

/// Runtime parameters for a chain run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Number of growth iterations after genesis.
    pub block_count: usize,
    /// Payload size for every generated block.
    pub samples_per_block: usize,
    /// Smallest accepted sample value.
    pub domain_min: f64,
    /// Largest accepted sample value.
    pub domain_max: f64,
    /// Fixed PRNG seed. `None` seeds from the current time.
    pub seed: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            block_count: DEFAULT_BLOCK_COUNT,
            samples_per_block: DEFAULT_SAMPLES_PER_BLOCK,
            domain_min: DEFAULT_DOMAIN_MIN,
            domain_max: DEFAULT_DOMAIN_MAX,
            seed: None,
        }
    }
}

impl ChainConfig {
    /// Checks that the configuration describes a runnable chain.
    ///
    /// A zero `block_count` is fine (genesis only). Zero samples is not,
    /// because every grown block must carry statistics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_block == 0 {
            return Err(ConfigError::NoSamples);
        }
        if !self.domain_min.is_finite() || !self.domain_max.is_finite() {
            return Err(ConfigError::NonFiniteDomain {
                min: self.domain_min,
                max: self.domain_max,
            });
        }
        if self.domain_min > self.domain_max {
            return Err(ConfigError::InvertedDomain {
                min: self.domain_min,
                max: self.domain_max,
            });
        }
        Ok(())
    }
}
