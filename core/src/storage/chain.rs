//! In-memory chain: an owned, append-only list of blocks starting at genesis.
//!
//! Appending never checks anything; the driver validates first. Use
//! [`Chain::verify`] to re-check the whole structure after the fact.

use serde::Serialize;
use thiserror::Error;

use super::block::Block;
use crate::config::GENESIS_INDEX;
use crate::validation::{ValidationError, Validator};

/// Errors found by a full-chain verification pass.
#[derive(Debug, Error, PartialEq)]
pub enum ChainError {
    /// The chain has no blocks at all, not even genesis.
    #[error("chain is empty")]
    Empty,

    /// The first block does not have the genesis shape.
    #[error("malformed genesis block: {0}")]
    MalformedGenesis(String),

    /// A non-genesis block failed the per-block validator.
    #[error("block at position {position} is invalid: {source}")]
    InvalidBlock {
        /// Position of the block in the chain (0 = genesis).
        position: usize,
        /// The validator's reason.
        #[source]
        source: ValidationError,
    },

    /// A block's `prev_hash` does not match its predecessor's hash.
    #[error("broken link at position {position}: prev_hash {found} != predecessor hash {expected}")]
    BrokenLink {
        /// Position of the offending block.
        position: usize,
        /// Hash of the actual predecessor.
        expected: String,
        /// `prev_hash` stored on the block.
        found: String,
    },

    /// A block's index is not its predecessor's index plus one.
    #[error("index gap at position {position}: expected {expected}, found {found}")]
    IndexGap {
        /// Position of the offending block.
        position: usize,
        /// Predecessor index plus one.
        expected: i64,
        /// Index stored on the block.
        found: i64,
    },
}

/// Ordered chain of accepted blocks.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Starts a chain from its genesis block.
    pub fn with_genesis(genesis: Block) -> Self {
        Self {
            blocks: vec![genesis],
        }
    }

    /// Appends a validated block to the chain tip.
    pub fn append(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Returns the latest block, if any.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Returns the genesis block, if any.
    pub fn genesis(&self) -> Option<&Block> {
        self.blocks.first()
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the chain holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks in chain order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterates over blocks in chain order.
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Full structural verification.
    ///
    /// Unlike the per-block [`Validator`], this also checks the genesis
    /// shape, `prev_hash` linkage and index continuity. Stops at the first
    /// problem found.
    pub fn verify(&self, validator: &Validator) -> Result<(), ChainError> {
        let genesis = self.genesis().ok_or(ChainError::Empty)?;
        verify_genesis(genesis)?;

        for (position, pair) in self.blocks.windows(2).enumerate() {
            let (prev, block) = (&pair[0], &pair[1]);
            let position = position + 1;

            validator
                .validate(block)
                .map_err(|source| ChainError::InvalidBlock { position, source })?;

            if block.prev_hash != prev.hash {
                return Err(ChainError::BrokenLink {
                    position,
                    expected: prev.hash.clone(),
                    found: block.prev_hash.clone(),
                });
            }

            let expected = prev.index + 1;
            if block.index != expected {
                return Err(ChainError::IndexGap {
                    position,
                    expected,
                    found: block.index,
                });
            }
        }

        Ok(())
    }
}

fn verify_genesis(genesis: &Block) -> Result<(), ChainError> {
    if !genesis.is_genesis() {
        return Err(ChainError::MalformedGenesis(format!(
            "index {} != {}",
            genesis.index, GENESIS_INDEX
        )));
    }
    if !genesis.data.is_empty() {
        return Err(ChainError::MalformedGenesis(format!(
            "carries {} samples",
            genesis.data.len()
        )));
    }
    if !genesis.prev_hash.is_empty() {
        return Err(ChainError::MalformedGenesis(
            "prev_hash must be empty".to_string(),
        ));
    }
    if genesis.hash != genesis.compute_hash() {
        return Err(ChainError::MalformedGenesis("hash mismatch".to_string()));
    }
    Ok(())
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
