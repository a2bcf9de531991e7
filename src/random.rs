//! Per-chain sources of randomness.
//!
//! Every chain owns its [`RandomSource`]; nothing is drawn from a process-wide
//! generator once a chain exists. Tests can swap in a scripted source without
//! touching the sampler.

use rand::distributions::OpenClosed01;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// The two draws a Metropolis-Hastings chain needs.
pub trait RandomSource {
    /// A draw from N(0, 1).
    fn standard_normal(&mut self) -> f64;

    /// A draw from the uniform distribution on (0, 1]. Never returns 0.
    fn uniform_nonzero(&mut self) -> f64;
}

/// [`SmallRng`]-backed source that remembers the seed it was built from.
#[derive(Debug, Clone)]
pub struct SeededSource {
    seed: u64,
    rng: SmallRng,
}

impl SeededSource {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeds from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::seed_from_u64(rand::thread_rng().gen())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededSource {
    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    fn uniform_nonzero(&mut self) -> f64 {
        self.rng.sample(OpenClosed01)
    }
}
