// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # StatChain CLI
//!
//! Entry point for the `statchain` binary. Parses CLI arguments, initializes
//! logging and metrics, grows a chain of sample blocks and prints it.
//!
//! Stdout carries the rejection diagnostics followed by the report. Logs and
//! the optional metrics dump go to stderr.

mod cli;
mod logging;
mod metrics;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use statchain_core::report::write_report;
use statchain_core::{ChainDriver, UniformSampler};

use cli::{Commands, StatChainCli};
use metrics::RunMetrics;

fn main() -> Result<()> {
    let cli = StatChainCli::parse();

    match cli.command {
        Commands::Run(args) => run_chain(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Builds the chain step by step, then reports, verifies and dumps metrics
/// as requested.
fn run_chain(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(&args.log_level, args.log_format);

    let config = args.to_config();
    let sampler = match config.seed {
        Some(seed) => UniformSampler::from_seed(seed),
        None => UniformSampler::from_time(),
    };

    tracing::info!(
        blocks = config.block_count,
        samples = config.samples_per_block,
        seed = sampler.seed(),
        "starting statchain run"
    );

    let metrics = RunMetrics::new().context("failed to register metrics")?;
    let mut driver = ChainDriver::new(config, sampler).context("invalid chain configuration")?;
    let validator = *driver.validator();
    tracing::info!(
        domain_min = validator.domain_min(),
        domain_max = validator.domain_max(),
        "validator ready"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // --- Growth ---
    driver
        .create_genesis()
        .context("failed to create genesis block")?;
    metrics.chain_length.set(driver.chain().len() as i64);

    for _ in 0..driver.config().block_count {
        let outcome = driver.step(&mut out).context("growth step failed")?;
        metrics.observe(&outcome, driver.last_build_seconds(), driver.chain().len());
    }
    driver.finish().context("failed to finish chain growth")?;

    // --- Report ---
    let chain = driver.into_chain();
    write_report(&chain, args.format.into(), &mut out).context("failed to write report")?;
    out.flush().context("failed to flush stdout")?;

    // --- Verification ---
    if args.verify {
        chain
            .verify(&validator)
            .context("chain verification failed")?;
        tracing::info!(blocks = chain.len(), "chain verified");
    }

    // --- Metrics ---
    if args.metrics {
        let text = metrics.encode().context("failed to encode metrics")?;
        eprint!("{text}");
    }

    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("statchain {}", env!("CARGO_PKG_VERSION"));
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
