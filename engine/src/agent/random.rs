//! Injectable randomness
//!
//! Every random decision the scheduler makes goes through [`RandomSource`],
//! so tests can script exact gate outcomes and production can seed from the
//! OS.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send {
    /// Uniform float in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`; `len` must be non-zero
    fn index(&mut self, len: usize) -> usize;

    /// Uniform integer in `min..=max`
    fn range_inclusive(&mut self, min: u64, max: u64) -> u64;

    /// Bernoulli gate: true with the given probability
    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

/// [`RandomSource`] backed by a `StdRng`
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn range_inclusive(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}
