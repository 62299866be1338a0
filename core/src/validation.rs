//! # Block Validation
//!
//! The gate every freshly generated block passes before it joins the chain.
//! Two checks, in order:
//!
//! 1. **Domain**: every sample lies in `[domain_min, domain_max]`.
//! 2. **Integrity**: the stored hash equals the hash recomputed from the
//!    block's own fields.
//!
//! The validator looks at one block in isolation. It does not compare
//! `prev_hash` against the real predecessor and does not check index
//! continuity; [`crate::storage::Chain::verify`] does that over a whole chain.

use thiserror::Error;

use crate::config::{ChainConfig, DEFAULT_DOMAIN_MAX, DEFAULT_DOMAIN_MIN};
use crate::storage::Block;

/// Why a block was rejected.
///
/// The reason is for logs only. Callers that just need accept/reject should
/// use [`Validator::is_valid`].
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A sample lies outside the accepted domain (NaN included).
    #[error("sample {position} = {value} outside [{min}, {max}]")]
    OutOfDomain {
        /// Position of the sample within the payload.
        position: usize,
        /// The offending value.
        value: f64,
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },

    /// The stored hash does not match the recomputed one.
    #[error("hash mismatch: stored={stored}, computed={computed}")]
    HashMismatch {
        /// Hash stored on the block.
        stored: String,
        /// Hash recomputed from the block's fields.
        computed: String,
    },
}

/// Per-block validity predicate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Validator {
    domain_min: f64,
    domain_max: f64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN_MIN, DEFAULT_DOMAIN_MAX)
    }
}

impl Validator {
    /// Creates a validator accepting samples in `[domain_min, domain_max]`.
    pub fn new(domain_min: f64, domain_max: f64) -> Self {
        Self {
            domain_min,
            domain_max,
        }
    }

    /// Creates a validator from the domain bounds of a [`ChainConfig`].
    pub fn from_config(cfg: &ChainConfig) -> Self {
        Self::new(cfg.domain_min, cfg.domain_max)
    }

    /// Lower bound of the accepted domain.
    pub fn domain_min(&self) -> f64 {
        self.domain_min
    }

    /// Upper bound of the accepted domain.
    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    /// Runs both checks and reports the first failure.
    pub fn validate(&self, block: &Block) -> Result<(), ValidationError> {
        self.check_domain(block)?;
        self.check_hash(block)?;
        Ok(())
    }

    /// Boolean form of [`Validator::validate`].
    pub fn is_valid(&self, block: &Block) -> bool {
        self.validate(block).is_ok()
    }

    fn check_domain(&self, block: &Block) -> Result<(), ValidationError> {
        let range = self.domain_min..=self.domain_max;
        match block
            .data
            .iter()
            .enumerate()
            .find(|(_, v)| !range.contains(*v))
        {
            Some((position, &value)) => Err(ValidationError::OutOfDomain {
                position,
                value,
                min: self.domain_min,
                max: self.domain_max,
            }),
            None => Ok(()),
        }
    }

    fn check_hash(&self, block: &Block) -> Result<(), ValidationError> {
        let computed = block.compute_hash();
        if computed != block.hash {
            return Err(ValidationError::HashMismatch {
                stored: block.hash.clone(),
                computed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn block_with(data: Vec<f64>) -> Block {
        let t0 = Utc.timestamp_opt(1_760_000_000, 0).unwrap();
        let t1 = Utc.timestamp_opt(1_760_000_001, 0).unwrap();
        Block::generate_at(&Block::genesis(t0), data, t1)
    }

    #[test]
    fn accepts_in_range_block() {
        let v = Validator::default();
        let block = block_with(vec![0.1, 0.5, 0.9]);
        assert!(v.validate(&block).is_ok());
        assert!(v.is_valid(&block));
    }

    #[test]
    fn accepts_domain_bounds_inclusive() {
        let v = Validator::default();
        assert!(v.is_valid(&block_with(vec![0.0, 1.0])));
    }

    #[test]
    fn rejects_value_above_domain() {
        let v = Validator::default();
        let block = block_with(vec![0.2, 1.5, -3.0]);
        assert_eq!(
            v.validate(&block),
            Err(ValidationError::OutOfDomain {
                position: 1,
                value: 1.5,
                min: 0.0,
                max: 1.0,
            })
        );
        assert!(!v.is_valid(&block));
    }

    #[test]
    fn rejects_value_below_domain() {
        let v = Validator::default();
        let block = block_with(vec![-0.0001]);
        assert!(matches!(
            v.validate(&block),
            Err(ValidationError::OutOfDomain { position: 0, .. })
        ));
    }

    #[test]
    fn rejects_nan_sample() {
        let v = Validator::default();
        let block = block_with(vec![0.5, f64::NAN]);
        assert!(!v.is_valid(&block));
    }

    #[test]
    fn rejects_tampered_hash() {
        let v = Validator::default();
        let mut block = block_with(vec![0.5]);
        block.hash = "00".repeat(32);
        match v.validate(&block) {
            Err(ValidationError::HashMismatch { stored, computed }) => {
                assert_eq!(stored, "00".repeat(32));
                assert_eq!(computed, block.compute_hash());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_tampered_payload() {
        let v = Validator::default();
        let mut block = block_with(vec![0.5, 0.6]);
        block.data[1] = 0.7;
        assert!(!v.is_valid(&block));
    }

    #[test]
    fn domain_check_runs_before_hash_check() {
        let v = Validator::default();
        let mut block = block_with(vec![2.0]);
        block.hash.clear();
        assert!(matches!(
            v.validate(&block),
            Err(ValidationError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn does_not_check_linkage() {
        // A self-consistent block with a bogus prev_hash still passes.
        let v = Validator::default();
        let mut block = block_with(vec![0.5]);
        block.prev_hash = "deadbeef".to_string();
        block.hash = block.compute_hash();
        assert!(v.is_valid(&block));
    }

    #[test]
    fn custom_domain_from_config() {
        let cfg = ChainConfig {
            domain_min: -1.0,
            domain_max: 2.0,
            ..ChainConfig::default()
        };
        let v = Validator::from_config(&cfg);
        assert_eq!(v.domain_min(), -1.0);
        assert_eq!(v.domain_max(), 2.0);
        assert!(v.is_valid(&block_with(vec![-0.5, 1.5])));
    }

    #[test]
    fn genesis_passes_validation() {
        let genesis = Block::genesis(Utc::now());
        assert!(Validator::default().is_valid(&genesis));
    }
}
