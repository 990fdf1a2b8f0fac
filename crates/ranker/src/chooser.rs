// ABOUTME: Injectable randomness for the feed pipeline.
// ABOUTME: Chooser trait (pick k of n without replacement) with a rand-backed default.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks `k` distinct indices from `0..n`.
///
/// All randomness in the pipeline goes through this seam so the rest of the
/// engine stays pure: production wiring uses [`RandomChooser`], tests inject
/// a deterministic stub such as [`TakeFirst`].
pub trait Chooser {
    /// Returns `min(k, n)` distinct indices in `0..n`, in any order.
    fn pick(&mut self, n: usize, k: usize) -> Vec<usize>;
}

/// Uniform random selection without replacement.
#[derive(Debug)]
pub struct RandomChooser<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomChooser<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomChooser<StdRng> {
    /// Chooser seeded from OS entropy; repeated generations draw differently
    /// on purpose so resurfacing feels fresh.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic chooser for reproducing a specific draw.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Chooser for RandomChooser<R> {
    fn pick(&mut self, n: usize, k: usize) -> Vec<usize> {
        let k = k.min(n);
        if k == 0 {
            return Vec::new();
        }
        rand::seq::index::sample(&mut self.rng, n, k).into_vec()
    }
}

/// Deterministic stub: always picks the first `k` indices in order.
#[derive(Debug, Default)]
pub struct TakeFirst;

impl Chooser for TakeFirst {
    fn pick(&mut self, n: usize, k: usize) -> Vec<usize> {
        (0..k.min(n)).collect()
    }
}
