//! # Storage Module
//!
//! The data structures that make StatChain a chain: the `Block` record and
//! the owned, append-only `Chain` that holds accepted blocks.
//!
//! ```text
//! block.rs  - Block structure, genesis, factory, hash computation
//! chain.rs  - Owned block list with full-chain verification
//! ```
//!
//! Nothing here touches disk. A chain lives exactly as long as the process
//! that grew it.

pub mod block;
pub mod chain;

pub use block::Block;
pub use chain::{Chain, ChainError};
