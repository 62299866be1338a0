//! # Chain Driver
//!
//! The `ChainDriver` owns the chain and grows it. It is the only component
//! that appends, and it only appends blocks that passed the validator.
//!
//! ## State Machine
//!
//! ```text
//! Empty ──create_genesis──▶ GenesisCreated ──step──▶ Growing ──finish──▶ Done
//!                                  │                   ▲  │
//!                                  │                   └──┘ step
//!                                  └───────────finish (block_count = 0)──▶ Done
//! ```
//!
//! ## One Growth Step
//!
//! ```text
//! 1. SAMPLE: draw `samples_per_block` values from the sample source
//! 2. BUILD: Block::generate_at on the current tip
//! 3. VALIDATE: domain + hash integrity
//! 4. COMMIT: append on success; print a diagnostic and skip on failure
//! ```
//!
//! A rejected candidate is dropped. The tip stays where it was, so the next
//! step builds on the last block that was actually appended.

use std::io::Write;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ChainConfig, ConfigError, INVALID_BLOCK_MESSAGE};
use crate::sampling::{Clock, SampleSource, SystemClock};
use crate::storage::{Block, Chain};
use crate::validation::{ValidationError, Validator};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors raised by the driver.
///
/// A rejected block is NOT an error; it is a normal [`StepOutcome`].
#[derive(Debug, Error)]
pub enum DriverError {
    /// The configuration cannot produce a valid run.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An operation was called in a state that does not allow it.
    #[error("cannot {operation} in state {state:?}")]
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the driver was in.
        state: DriverState,
    },

    /// `step` was called after all configured iterations ran.
    #[error("all {block_count} growth iterations already ran")]
    GrowthExhausted {
        /// Configured number of iterations.
        block_count: usize,
    },

    /// `finish` was called before all configured iterations ran.
    #[error("growth incomplete: {done} of {block_count} iterations ran")]
    GrowthIncomplete {
        /// Iterations completed so far.
        done: usize,
        /// Configured number of iterations.
        block_count: usize,
    },

    /// Writing the rejection diagnostic failed.
    #[error("failed to write diagnostic: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// State & Outcomes
// ---------------------------------------------------------------------------

/// Lifecycle of a driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DriverState {
    /// Nothing built yet.
    Empty,
    /// Genesis appended, no growth step taken.
    GenesisCreated,
    /// At least one growth step taken.
    Growing,
    /// Growth finished. The chain is read-only from here on.
    Done,
}

/// Result of submitting one candidate block.
#[derive(Debug, PartialEq)]
pub enum StepOutcome {
    /// The candidate passed validation and is the new tip.
    Appended {
        /// Index of the appended block.
        index: i64,
        /// Hash of the appended block.
        hash: String,
    },
    /// The candidate failed validation and was discarded.
    Rejected {
        /// Index the candidate would have had.
        index: i64,
        /// Why the validator refused it.
        reason: ValidationError,
    },
}

impl StepOutcome {
    /// Whether the candidate made it into the chain.
    pub fn is_appended(&self) -> bool {
        matches!(self, StepOutcome::Appended { .. })
    }
}

/// Counters for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Growth iterations executed.
    pub attempted: usize,
    /// Candidates appended.
    pub appended: usize,
    /// Candidates rejected.
    pub rejected: usize,
    /// Blocks in the chain, genesis included.
    pub chain_length: usize,
}

// ---------------------------------------------------------------------------
// ChainDriver
// ---------------------------------------------------------------------------

/// Owns a chain and drives it from empty to done.
///
/// Generic over the sample source and the clock so tests can pin both.
pub struct ChainDriver<S, C = SystemClock> {
    config: ChainConfig,
    validator: Validator,
    sampler: S,
    clock: C,
    chain: Chain,
    state: DriverState,
    summary: RunSummary,
    last_build_seconds: f64,
}

impl<S: SampleSource> ChainDriver<S, SystemClock> {
    /// Creates a driver that stamps blocks with wall-clock time.
    pub fn new(config: ChainConfig, sampler: S) -> Result<Self, DriverError> {
        Self::with_clock(config, sampler, SystemClock)
    }
}

impl<S: SampleSource, C: Clock> ChainDriver<S, C> {
    /// Creates a driver with an explicit clock.
    ///
    /// Fails if the configuration does not pass [`ChainConfig::validate`].
    pub fn with_clock(config: ChainConfig, sampler: S, clock: C) -> Result<Self, DriverError> {
        config.validate()?;
        let validator = Validator::from_config(&config);
        Ok(Self {
            config,
            validator,
            sampler,
            clock,
            chain: Chain::default(),
            state: DriverState::Empty,
            summary: RunSummary::default(),
            last_build_seconds: 0.0,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The chain built so far.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// The validator used to gate appends.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// The configuration this driver runs with.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Counters so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            chain_length: self.chain.len(),
            ..self.summary
        }
    }

    /// Wall time spent building and validating the most recent candidate.
    pub fn last_build_seconds(&self) -> f64 {
        self.last_build_seconds
    }

    /// `Empty → GenesisCreated`: build and append the genesis block.
    ///
    /// Genesis is appended without validation.
    pub fn create_genesis(&mut self) -> Result<&Block, DriverError> {
        self.require(&[DriverState::Empty], "create genesis")?;

        let genesis = Block::genesis(self.clock.now());
        info!(index = genesis.index, hash = %genesis.hash, "genesis block created");

        self.chain = Chain::with_genesis(genesis);
        self.state = DriverState::GenesisCreated;
        self.chain.tip().ok_or(DriverError::InvalidState {
            operation: "read genesis",
            state: self.state,
        })
    }

    /// One growth iteration: sample, build on the tip, validate, and
    /// append or reject.
    ///
    /// On rejection the diagnostic line is written to `out` and the tip is
    /// left unchanged. The iteration counts as attempted even when writing
    /// the diagnostic fails.
    pub fn step<W: Write>(&mut self, out: &mut W) -> Result<StepOutcome, DriverError> {
        self.require(
            &[DriverState::GenesisCreated, DriverState::Growing],
            "grow the chain",
        )?;
        if self.summary.attempted >= self.config.block_count {
            return Err(DriverError::GrowthExhausted {
                block_count: self.config.block_count,
            });
        }

        let data = self.sampler.sample(self.config.samples_per_block);
        let started = Instant::now();
        let candidate = self.build_candidate(data)?;
        self.summary.attempted += 1;
        let outcome = self.submit(candidate, out);
        self.last_build_seconds = started.elapsed().as_secs_f64();

        outcome
    }

    /// Validation gate: append `candidate` if it is valid, otherwise write
    /// the diagnostic to `out` and drop it.
    ///
    /// Does not count as a growth iteration. [`ChainDriver::step`] calls this
    /// after building its candidate; tests call it directly to feed
    /// hand-crafted blocks.
    pub fn submit<W: Write>(
        &mut self,
        candidate: Block,
        out: &mut W,
    ) -> Result<StepOutcome, DriverError> {
        self.require(
            &[DriverState::GenesisCreated, DriverState::Growing],
            "submit a block",
        )?;
        self.state = DriverState::Growing;

        match self.validator.validate(&candidate) {
            Ok(()) => {
                info!(
                    index = candidate.index,
                    hash = %candidate.hash,
                    samples = candidate.data.len(),
                    "block appended"
                );
                let outcome = StepOutcome::Appended {
                    index: candidate.index,
                    hash: candidate.hash.clone(),
                };
                self.chain.append(candidate);
                self.summary.appended += 1;
                Ok(outcome)
            }
            Err(reason) => {
                warn!(index = candidate.index, %reason, "block rejected");
                self.summary.rejected += 1;
                writeln!(out, "{INVALID_BLOCK_MESSAGE}")?;
                Ok(StepOutcome::Rejected {
                    index: candidate.index,
                    reason,
                })
            }
        }
    }

    /// `GenesisCreated/Growing → Done` once every iteration has run.
    pub fn finish(&mut self) -> Result<RunSummary, DriverError> {
        self.require(
            &[DriverState::GenesisCreated, DriverState::Growing],
            "finish",
        )?;
        if self.summary.attempted < self.config.block_count {
            return Err(DriverError::GrowthIncomplete {
                done: self.summary.attempted,
                block_count: self.config.block_count,
            });
        }

        self.state = DriverState::Done;
        let summary = self.summary();
        info!(
            attempted = summary.attempted,
            appended = summary.appended,
            rejected = summary.rejected,
            chain_length = summary.chain_length,
            "chain growth finished"
        );
        Ok(summary)
    }

    /// Runs the whole machine: genesis, `block_count` steps, finish.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary, DriverError> {
        self.create_genesis()?;
        for _ in 0..self.config.block_count {
            self.step(out)?;
        }
        self.finish()
    }

    /// Consumes the driver and hands over the chain.
    pub fn into_chain(self) -> Chain {
        self.chain
    }

    fn build_candidate(&self, data: Vec<f64>) -> Result<Block, DriverError> {
        let tip = self.chain.tip().ok_or(DriverError::InvalidState {
            operation: "build on the tip",
            state: self.state,
        })?;
        debug!(parent = tip.index, samples = data.len(), "building candidate");
        Ok(Block::generate_at(tip, data, self.clock.now()))
    }

    fn require(&self, allowed: &[DriverState], operation: &'static str) -> Result<(), DriverError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(DriverError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::UniformSampler;
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::Cell;

    /// Clock that ticks one millisecond per call.
    struct TickClock {
        next: Cell<i64>,
    }

    impl TickClock {
        fn new() -> Self {
            Self {
                next: Cell::new(1_760_000_000_000),
            }
        }
    }

    impl Clock for TickClock {
        fn now(&self) -> DateTime<Utc> {
            let ms = self.next.get();
            self.next.set(ms + 1);
            Utc.timestamp_millis_opt(ms).unwrap()
        }
    }

    /// Replays a fixed list of payloads, one per call.
    struct ScriptedSamples {
        payloads: Vec<Vec<f64>>,
    }

    impl SampleSource for ScriptedSamples {
        fn sample(&mut self, _count: usize) -> Vec<f64> {
            self.payloads.remove(0)
        }
    }

    fn config(block_count: usize) -> ChainConfig {
        ChainConfig {
            block_count,
            samples_per_block: 4,
            ..ChainConfig::default()
        }
    }

    fn seeded_driver(block_count: usize) -> ChainDriver<UniformSampler, TickClock> {
        ChainDriver::with_clock(
            config(block_count),
            UniformSampler::from_seed(42),
            TickClock::new(),
        )
        .expect("valid config")
    }

    #[test]
    fn starts_empty() {
        let driver = seeded_driver(3);
        assert_eq!(driver.state(), DriverState::Empty);
        assert!(driver.chain().is_empty());
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = ChainConfig {
            samples_per_block: 0,
            ..ChainConfig::default()
        };
        let result = ChainDriver::new(cfg, UniformSampler::from_seed(1));
        assert!(matches!(
            result,
            Err(DriverError::Config(ConfigError::NoSamples))
        ));
    }

    #[test]
    fn genesis_transition() {
        let mut driver = seeded_driver(3);
        let genesis = driver.create_genesis().expect("genesis").clone();
        assert_eq!(genesis.index, -1);
        assert!(genesis.data.is_empty());
        assert!(genesis.stats.is_none());
        assert!(!genesis.hash.is_empty());
        assert_eq!(driver.state(), DriverState::GenesisCreated);
        assert_eq!(driver.chain().len(), 1);
    }

    #[test]
    fn genesis_twice_is_rejected() {
        let mut driver = seeded_driver(3);
        driver.create_genesis().unwrap();
        assert!(matches!(
            driver.create_genesis(),
            Err(DriverError::InvalidState {
                state: DriverState::GenesisCreated,
                ..
            })
        ));
    }

    #[test]
    fn step_before_genesis_is_rejected() {
        let mut driver = seeded_driver(3);
        let mut out = Vec::new();
        assert!(matches!(
            driver.step(&mut out),
            Err(DriverError::InvalidState {
                state: DriverState::Empty,
                ..
            })
        ));
    }

    #[test]
    fn full_run_builds_linked_chain() {
        let mut driver = seeded_driver(10);
        let mut out = Vec::new();
        let summary = driver.run(&mut out).expect("run");

        assert_eq!(driver.state(), DriverState::Done);
        assert_eq!(
            summary,
            RunSummary {
                attempted: 10,
                appended: 10,
                rejected: 0,
                chain_length: 11,
            }
        );
        assert!(out.is_empty(), "no diagnostics expected");

        let chain = driver.into_chain();
        let indices: Vec<i64> = chain.iter().map(|b| b.index).collect();
        assert_eq!(indices, (-1..10).collect::<Vec<i64>>());
        for pair in chain.blocks().windows(2) {
            assert_eq!(pair[1].prev_hash, pair[0].hash);
        }
        assert!(chain.verify(&Validator::default()).is_ok());
    }

    #[test]
    fn out_of_range_candidate_is_rejected_and_tip_holds() {
        let samples = ScriptedSamples {
            payloads: vec![
                vec![0.1, 0.2, 0.3, 0.4],
                vec![0.5, 1.7, 0.2, 0.1],
                vec![0.6, 0.7, 0.8, 0.9],
            ],
        };
        let mut driver =
            ChainDriver::with_clock(config(3), samples, TickClock::new()).expect("config");
        let mut out = Vec::new();

        driver.create_genesis().unwrap();

        let first = driver.step(&mut out).unwrap();
        assert!(first.is_appended());
        let tip_hash = driver.chain().tip().unwrap().hash.clone();

        let second = driver.step(&mut out).unwrap();
        match second {
            StepOutcome::Rejected { index, reason } => {
                assert_eq!(index, 1);
                assert!(matches!(
                    reason,
                    ValidationError::OutOfDomain { position: 1, .. }
                ));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(driver.chain().tip().unwrap().hash, tip_hash);
        assert_eq!(driver.chain().len(), 2);

        // Next block builds on the last appended block, not on the reject.
        let third = driver.step(&mut out).unwrap();
        assert_eq!(
            third,
            StepOutcome::Appended {
                index: 1,
                hash: driver.chain().tip().unwrap().hash.clone(),
            }
        );
        assert_eq!(driver.chain().tip().unwrap().prev_hash, tip_hash);

        let summary = driver.finish().unwrap();
        assert_eq!(summary.appended, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.chain_length, 3);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Invalid block detected. Skipping...\n");
    }

    #[test]
    fn tampered_candidate_is_rejected_via_submit() {
        let mut driver = seeded_driver(1);
        let mut out = Vec::new();
        let genesis = driver.create_genesis().unwrap().clone();

        let mut forged = Block::generate(&genesis, vec![0.5, 0.5]);
        forged.data[0] = 0.25;

        let outcome = driver.submit(forged, &mut out).unwrap();
        assert!(matches!(
            outcome,
            StepOutcome::Rejected {
                reason: ValidationError::HashMismatch { .. },
                ..
            }
        ));
        assert_eq!(driver.chain().len(), 1);
        assert_eq!(driver.state(), DriverState::Growing);
    }

    /// Sink that refuses every write.
    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn rejection_is_counted_when_diagnostic_write_fails() {
        let samples = ScriptedSamples {
            payloads: vec![vec![0.1, 2.0, 0.3, 0.4], vec![0.1, 0.2, 0.3, 0.4]],
        };
        let mut driver =
            ChainDriver::with_clock(config(2), samples, TickClock::new()).expect("config");
        driver.create_genesis().unwrap();

        let result = driver.step(&mut BrokenSink);
        assert!(matches!(result, Err(DriverError::Io(_))));
        assert_eq!(
            driver.summary(),
            RunSummary {
                attempted: 1,
                appended: 0,
                rejected: 1,
                chain_length: 1,
            }
        );

        // The run can still be completed once the sink recovers.
        let mut out = Vec::new();
        assert!(driver.step(&mut out).unwrap().is_appended());
        let summary = driver.finish().unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.appended, 1);
    }

    #[test]
    fn step_past_block_count_is_rejected() {
        let mut driver = seeded_driver(1);
        let mut out = Vec::new();
        driver.create_genesis().unwrap();
        driver.step(&mut out).unwrap();
        assert!(matches!(
            driver.step(&mut out),
            Err(DriverError::GrowthExhausted { block_count: 1 })
        ));
    }

    #[test]
    fn finish_early_is_rejected() {
        let mut driver = seeded_driver(2);
        let mut out = Vec::new();
        driver.create_genesis().unwrap();
        driver.step(&mut out).unwrap();
        assert!(matches!(
            driver.finish(),
            Err(DriverError::GrowthIncomplete {
                done: 1,
                block_count: 2
            })
        ));
    }

    #[test]
    fn done_is_terminal() {
        let mut driver = seeded_driver(0);
        let mut out = Vec::new();
        let summary = driver.run(&mut out).unwrap();
        assert_eq!(summary.chain_length, 1);
        assert_eq!(driver.state(), DriverState::Done);

        assert!(driver.step(&mut out).is_err());
        assert!(driver.finish().is_err());
        assert!(driver.create_genesis().is_err());
        let genesis = driver.chain().genesis().unwrap().clone();
        assert!(driver
            .submit(Block::generate(&genesis, vec![0.5]), &mut out)
            .is_err());
        assert_eq!(driver.chain().len(), 1);
    }

    #[test]
    fn same_seed_same_payloads() {
        let mut a = seeded_driver(3);
        let mut b = seeded_driver(3);
        let mut out = Vec::new();
        a.run(&mut out).unwrap();
        b.run(&mut out).unwrap();

        let data_a: Vec<&Vec<f64>> = a.chain().iter().map(|blk| &blk.data).collect();
        let data_b: Vec<&Vec<f64>> = b.chain().iter().map(|blk| &blk.data).collect();
        assert_eq!(data_a, data_b);
        // Same clock script too, so the hashes match as well.
        assert_eq!(a.chain().tip().unwrap().hash, b.chain().tip().unwrap().hash);
    }

    #[test]
    fn timestamps_do_not_decrease() {
        let mut driver = ChainDriver::new(config(5), UniformSampler::from_seed(5)).unwrap();
        let mut out = Vec::new();
        driver.run(&mut out).unwrap();
        for pair in driver.chain().blocks().windows(2) {
            assert!(pair[1].timestamp >= pair[0].timestamp);
        }
    }
}
