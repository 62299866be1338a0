//! # Run Logging
//!
//! `statchain run` prints its report and the `Invalid block detected`
//! lines on stdout, so anyone piping the report into a file or `jq` must
//! never see a log line there. Every tracing event from the core library
//! (`debug!` per candidate, `info!` per append, `warn!` per rejection) is
//! therefore routed to stderr.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from `--log-level`
//! (`STATCHAIN_LOG`). To see every candidate as it is built:
//!
//! ```text
//! RUST_LOG=statchain_core=debug statchain run --seed 7 > chain.txt
//! ```

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log events on stderr are rendered.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored single-line events with source locations, for a terminal.
    Pretty,
    /// One JSON object per event, for collecting runs side by side.
    Json,
}

/// Picks the event filter: `RUST_LOG` wins, `fallback` otherwise.
fn run_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Installs the stderr subscriber for a `statchain run`.
///
/// Must run before the driver is built so the genesis event is captured.
/// A second call panics because the global subscriber is already set.
pub fn init_logging(fallback: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(run_filter(fallback));

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .init(),
    }

    tracing::debug!(?format, "stderr logging ready");
}
