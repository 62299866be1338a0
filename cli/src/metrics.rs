//! # Run Metrics
//!
//! Prometheus counters for a single chain run. There is no HTTP exporter;
//! the registry is encoded once at the end of the run when `--metrics` is
//! passed.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] with
//! the `statchain` prefix.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

use statchain_core::StepOutcome;

/// Holds all Prometheus metric handles for a run.
pub struct RunMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Candidates that passed validation.
    pub blocks_appended_total: IntCounter,
    /// Candidates that failed validation.
    pub blocks_rejected_total: IntCounter,
    /// Current number of blocks in the chain, genesis included.
    pub chain_length: IntGauge,
    /// Time to build and validate one candidate.
    pub block_build_seconds: Histogram,
}

impl RunMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("statchain".into()), None)?;

        let blocks_appended_total = IntCounter::new(
            "blocks_appended_total",
            "Total number of candidate blocks appended to the chain",
        )?;
        registry.register(Box::new(blocks_appended_total.clone()))?;

        let blocks_rejected_total = IntCounter::new(
            "blocks_rejected_total",
            "Total number of candidate blocks rejected by the validator",
        )?;
        registry.register(Box::new(blocks_rejected_total.clone()))?;

        let chain_length = IntGauge::new(
            "chain_length",
            "Number of blocks in the chain, genesis included",
        )?;
        registry.register(Box::new(chain_length.clone()))?;

        let block_build_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "block_build_seconds",
                "Time to build and validate one candidate block, in seconds",
            )
            .buckets(vec![
                0.000_001, 0.000_005, 0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.01,
            ]),
        )?;
        registry.register(Box::new(block_build_seconds.clone()))?;

        Ok(Self {
            registry,
            blocks_appended_total,
            blocks_rejected_total,
            chain_length,
            block_build_seconds,
        })
    }

    /// Records one growth step.
    pub fn observe(&self, outcome: &StepOutcome, build_seconds: f64, chain_length: usize) {
        match outcome {
            StepOutcome::Appended { .. } => self.blocks_appended_total.inc(),
            StepOutcome::Rejected { .. } => self.blocks_rejected_total.inc(),
        }
        self.block_build_seconds.observe(build_seconds);
        self.chain_length.set(chain_length as i64);
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
