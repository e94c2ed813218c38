//! Injectable random source for profile selection and segment sampling.
//!
//! Generation never touches a process-wide generator. Every component that
//! needs randomness takes a [`RandomSource`], so seeded runs are reproducible
//! and tests can script exact draws.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform random values.
pub trait RandomSource {
    /// Next uniform float in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Next uniform integer in `[0, bound)`. `bound` must be non-zero.
    fn next_below(&mut self, bound: u32) -> u32 {
        let value = (self.next_f32() * bound as f32) as u32;
        // float rounding can land exactly on bound
        value.min(bound.saturating_sub(1))
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        (**self).next_below(bound)
    }
}

/// Adapter exposing any `rand` generator as a [`RandomSource`].
#[derive(Clone, Debug)]
pub struct RngSource<R: RngCore> {
    rng: R,
}

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<ChaCha8Rng> {
    /// Deterministic source for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn next_f32(&mut self) -> f32 {
        self.rng.r#gen::<f32>()
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }
}

/// Scripted source replaying a fixed list of floats, cycling when exhausted.
#[cfg(test)]
pub(crate) struct ScriptedSource {
    values: Vec<f32>,
    cursor: usize,
    pub calls: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0, calls: 0 }
    }

    /// Source that always returns the same value.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_f32(&mut self) -> f32 {
        self.calls += 1;
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
