//! # Chain Report
//!
//! Renders a finished chain for humans (text) or tools (JSON). Rendering is
//! read-only; nothing here can change the chain.
//!
//! ## Text Layout
//!
//! One line per field, one separator per block, genesis first:
//!
//! ```text
//! Index: 0
//! Timestamp: 2026-10-19T17:04:05.123456789Z
//! Data: [0.25 0.5 0.75]
//! PrevHash: 5e88...
//! Hash: 9f86...
//! Mean: 0.500000
//! Median: 0.500000
//! 2-SD Range: 0.408248
//! ------------------
//! ```
//!
//! Statistics that are unset (genesis) print as `0.000000`.

use std::io::Write;

use thiserror::Error;

use crate::config::REPORT_SEPARATOR;
use crate::storage::block::{format_data, format_timestamp};
use crate::storage::{Block, Chain};

/// Errors raised while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The output sink refused the write.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("failed to encode report as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format of the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Line-per-field text.
    #[default]
    Text,
    /// Pretty-printed JSON array of blocks.
    Json,
}

/// Write `chain` to `out` in the requested format.
pub fn write_report<W: Write>(
    chain: &Chain,
    format: ReportFormat,
    out: &mut W,
) -> Result<(), ReportError> {
    match format {
        ReportFormat::Text => write_text(chain, out)?,
        ReportFormat::Json => write_json(chain, out)?,
    }
    Ok(())
}

/// Write the line-per-field text report.
pub fn write_text<W: Write>(chain: &Chain, out: &mut W) -> std::io::Result<()> {
    for block in chain {
        write_block(block, out)?;
    }
    Ok(())
}

/// Write a single block in text form, followed by the separator line.
pub fn write_block<W: Write>(block: &Block, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Index: {}", block.index)?;
    writeln!(out, "Timestamp: {}", format_timestamp(&block.timestamp))?;
    writeln!(out, "Data: {}", format_data(&block.data))?;
    writeln!(out, "PrevHash: {}", block.prev_hash)?;
    writeln!(out, "Hash: {}", block.hash)?;
    writeln!(out, "Mean: {:.6}", block.mean().unwrap_or_default())?;
    writeln!(out, "Median: {:.6}", block.median().unwrap_or_default())?;
    writeln!(out, "2-SD Range: {:.6}", block.spread().unwrap_or_default())?;
    writeln!(out, "{REPORT_SEPARATOR}")?;
    Ok(())
}

/// Write the chain as a pretty-printed JSON array.
pub fn write_json<W: Write>(chain: &Chain, out: &mut W) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut *out, chain)?;
    writeln!(out).map_err(serde_json::Error::io)?;
    Ok(())
}
