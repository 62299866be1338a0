// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # StatChain Core Library
//!
//! A small, local, append-only chain of blocks. Each block carries a batch
//! of numeric samples, a SHA-256 link to its predecessor, and summary
//! statistics over its own samples. There is no network, no consensus and
//! no disk: one process grows one chain and prints it.
//!
//! ## Architecture
//!
//! - **config**: Compiled-in defaults and the runtime `ChainConfig`.
//! - **crypto**: SHA-256 helpers. The only primitive we need.
//! - **stats**: Mean, median and spread over a sample batch.
//! - **storage**: The `Block` type, its factory, and the owned `Chain`.
//! - **validation**: Domain and hash-integrity checks for fresh blocks.
//! - **sampling**: Where the sample payloads come from.
//! - **driver**: The growth state machine: genesis, grow, done.
//! - **report**: Text and JSON rendering of a finished chain.
//!
//! ## Data Flow
//!
//! ```text
//! ChainDriver → Block::generate → (sha256, Summary) → Validator → Chain
//!                                                          ↓
//!                                                   append / reject
//! ```

pub mod config;
pub mod crypto;
pub mod driver;
pub mod report;
pub mod sampling;
pub mod stats;
pub mod storage;
pub mod validation;

pub use config::{ChainConfig, ConfigError};
pub use driver::{ChainDriver, DriverError, DriverState, RunSummary, StepOutcome};
pub use sampling::{Clock, SampleSource, SystemClock, UniformSampler};
pub use stats::Summary;
pub use storage::{Block, Chain, ChainError};
pub use validation::{ValidationError, Validator};
