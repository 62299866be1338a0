//! # CLI Interface
//!
//! Defines the command-line argument structure for `statchain` using
//! `clap` derive. Two subcommands: `run` and `version`.

use clap::{Parser, Subcommand, ValueEnum};

use statchain_core::config::{
    DEFAULT_BLOCK_COUNT, DEFAULT_DOMAIN_MAX, DEFAULT_DOMAIN_MIN, DEFAULT_SAMPLES_PER_BLOCK,
};
use statchain_core::report::ReportFormat;
use statchain_core::ChainConfig;

use crate::logging::LogFormat;

/// Grow a hash-linked chain of sample blocks and print it.
///
/// Every block carries a batch of uniform samples, the SHA-256 hash of its
/// predecessor, and the mean, median and 2-SD spread of its samples.
#[derive(Parser, Debug)]
#[command(
    name = "statchain",
    about = "Hash-chained sample blocks with summary statistics",
    version,
    propagate_version = true
)]
pub struct StatChainCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a chain and print the report.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Report format selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per field, one separator per block.
    Text,
    /// Pretty-printed JSON array of blocks.
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of growth iterations after genesis.
    #[arg(long, short = 'n', env = "STATCHAIN_BLOCKS", default_value_t = DEFAULT_BLOCK_COUNT)]
    pub blocks: usize,

    /// Number of samples per block.
    #[arg(long, short = 's', env = "STATCHAIN_SAMPLES", default_value_t = DEFAULT_SAMPLES_PER_BLOCK)]
    pub samples: usize,

    /// Smallest sample value the validator accepts.
    #[arg(
        long,
        env = "STATCHAIN_DOMAIN_MIN",
        default_value_t = DEFAULT_DOMAIN_MIN,
        allow_negative_numbers = true
    )]
    pub domain_min: f64,

    /// Largest sample value the validator accepts.
    ///
    /// Samples are always drawn from [0, 1), so narrowing the domain below
    /// that makes the validator reject some candidates.
    #[arg(
        long,
        env = "STATCHAIN_DOMAIN_MAX",
        default_value_t = DEFAULT_DOMAIN_MAX,
        allow_negative_numbers = true
    )]
    pub domain_max: f64,

    /// Fixed PRNG seed. When omitted the seed is derived from the clock.
    #[arg(long, env = "STATCHAIN_SEED")]
    pub seed: Option<u64>,

    /// Report format written to stdout.
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Re-verify linkage, indices and hashes of the whole chain after growth.
    #[arg(long)]
    pub verify: bool,

    /// Print run counters in Prometheus text format to stderr.
    #[arg(long)]
    pub metrics: bool,

    /// Log output format.
    #[arg(long, value_enum, env = "STATCHAIN_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, env = "STATCHAIN_LOG", default_value = "statchain=info,statchain_core=info")]
    pub log_level: String,
}

impl RunArgs {
    /// Builds the core configuration from the parsed flags.
    pub fn to_config(&self) -> ChainConfig {
        ChainConfig {
            block_count: self.blocks,
            samples_per_block: self.samples,
            domain_min: self.domain_min,
            domain_max: self.domain_max,
            seed: self.seed,
        }
    }
}
