//! Injected source of shuffle indices.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RandomError {
    #[error("exclusive upper bound must be greater than zero (was {0})")]
    InvalidBound(usize),
    #[error("random source returned index {index} outside of [0, {bound})")]
    OutOfRange { index: usize, bound: usize },
}

/// Picks a uniformly distributed index in `[0, exclusive_upper_bound)`.
///
/// Shuffles call this once per remaining card, so implementations must be
/// cheap and must never block.
pub trait RandomIndexSource {
    fn next_index(&mut self, exclusive_upper_bound: usize) -> Result<usize, RandomError>;
}

impl<T: RandomIndexSource + ?Sized> RandomIndexSource for &mut T {
    fn next_index(&mut self, exclusive_upper_bound: usize) -> Result<usize, RandomError> {
        (**self).next_index(exclusive_upper_bound)
    }
}

impl<T: RandomIndexSource + ?Sized> RandomIndexSource for Box<T> {
    fn next_index(&mut self, exclusive_upper_bound: usize) -> Result<usize, RandomError> {
        (**self).next_index(exclusive_upper_bound)
    }
}

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngIndexSource<R = StdRng> {
    rng: R,
}

impl<R: Rng> RngIndexSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngIndexSource<StdRng> {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomIndexSource for RngIndexSource<R> {
    fn next_index(&mut self, exclusive_upper_bound: usize) -> Result<usize, RandomError> {
        if exclusive_upper_bound == 0 {
            return Err(RandomError::InvalidBound(exclusive_upper_bound));
        }
        Ok(self.rng.gen_range(0..exclusive_upper_bound))
    }
}
