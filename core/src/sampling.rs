//! # Sample & Time Sources
//!
//! The driver needs two things from the outside world: sample payloads and
//! the current time. Both sit behind small traits so tests can pin them.
//!
//! [`UniformSampler`] is a plain `StdRng` seeded once. It is not meant to be
//! cryptographically secure; it only produces demo payloads.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces a payload of `count` samples.
pub trait SampleSource {
    fn sample(&mut self, count: usize) -> Vec<f64>;
}

/// Supplies block timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time via `chrono::Utc::now`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Uniform samples in `[low, high)` from a seeded `StdRng`.
#[derive(Clone, Debug)]
pub struct UniformSampler {
    rng: StdRng,
    low: f64,
    high: f64,
    seed: u64,
}

impl UniformSampler {
    /// Sampler over `[0.0, 1.0)` with an explicit seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_range(seed, 0.0, 1.0)
    }

    /// Sampler over `[0.0, 1.0)` seeded from the current time.
    pub fn from_time() -> Self {
        Self::from_seed(time_seed())
    }

    /// Sampler over `[low, high)` with an explicit seed.
    ///
    /// An empty or inverted range yields `low` for every sample.
    pub fn with_range(seed: u64, low: f64, high: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            low,
            high,
            seed,
        }
    }

    /// The seed this sampler was built with. Logged so a run can be replayed.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl SampleSource for UniformSampler {
    fn sample(&mut self, count: usize) -> Vec<f64> {
        if self.high <= self.low {
            return vec![self.low; count];
        }
        (0..count)
            .map(|_| self.rng.gen_range(self.low..self.high))
            .collect()
    }
}

/// Seed derived from the current time, in nanoseconds since the epoch.
pub fn time_seed() -> u64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .map(|n| n as u64)
        .unwrap_or_else(|| now.timestamp_micros() as u64)
}
