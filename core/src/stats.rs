//! # Sample Statistics
//!
//! The three numbers every grown block carries about its payload:
//!
//! - **mean**: arithmetic mean.
//! - **median**: middle value of the sorted samples (average of the two
//!   middle values for an even count).
//! - **spread**: twice the population standard deviation (divisor `n`,
//!   not `n - 1`).
//!
//! All functions are pure and return `None` for an empty slice. They do not
//! validate their input; NaN and infinities propagate per IEEE 754. The
//! validator upstream is what keeps samples inside the configured domain.

use serde::{Deserialize, Serialize};

/// Arithmetic mean of `data`.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let sum: f64 = data.iter().sum();
    Some(sum / data.len() as f64)
}

/// Median of `data`.
///
/// Sorts a private copy, so the caller's ordering is left untouched.
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Twice the population standard deviation of `data`.
pub fn spread(data: &[f64]) -> Option<f64> {
    let mean = mean(data)?;
    let variance = data.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / data.len() as f64;
    Some(2.0 * variance.sqrt())
}

/// Summary statistics stored on a block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Arithmetic mean of the payload.
    pub mean: f64,
    /// Median of the payload.
    pub median: f64,
    /// Twice the population standard deviation of the payload.
    pub spread: f64,
}

impl Summary {
    /// Compute all three statistics at once. `None` for an empty payload.
    pub fn compute(data: &[f64]) -> Option<Self> {
        Some(Self {
            mean: mean(data)?,
            median: median(data)?,
            spread: spread(data)?,
        })
    }
}
