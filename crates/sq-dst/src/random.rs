//! Seeded randomness.
//!
//! Every random choice a DST run makes goes through one of these, so the
//! same seed replays the same run.

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Deterministic RNG seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    seed: u64,
    inner: StdRng,
}

impl DeterministicRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent generator derived from this one's stream.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        Self::new(self.inner.next_u64())
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.inner.gen_range(range)
    }

    /// `true` with probability `p`. Out-of-range probabilities are clamped.
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }
}
