//! Optimization engine for SVM training
//!
//! The SMO loop draws its second working index through the
//! [`PairSelector`] capability so that callers control the only source
//! of nondeterminism in training. Tests can supply a scripted selector
//! and replay identical runs bit for bit.

pub mod smo;

pub use smo::{SmoResult, SmoSolver};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of the second working index for a pair update
pub trait PairSelector {
    /// Return an index in `0..n` different from `skip`.
    ///
    /// Callers guarantee `n >= 2`.
    fn pick(&mut self, n: usize, skip: usize) -> usize;
}

/// Uniform draw backed by a `rand` generator
pub struct RandomPair<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPair<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomPair<SmallRng> {
    /// Deterministic selector for reproducible training runs
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Entropy-seeded selector for everyday training
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

impl<R: Rng> PairSelector for RandomPair<R> {
    fn pick(&mut self, n: usize, skip: usize) -> usize {
        loop {
            let j = self.rng.gen_range(0..n);
            if j != skip {
                return j;
            }
        }
    }
}
