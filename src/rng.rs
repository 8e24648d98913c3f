//! Explicit RNG handle threaded through construction, replacing the
//! process-wide singleton the original implementation relied on.

use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};
use rand_distr::{Distribution, Normal};

/// A small wrapper around `rand::rngs::StdRng`. Not thread-safe by design:
/// callers that need randomness across threads should give each thread its
/// own handle, since the trainer and LM loop are single-threaded anyway.
#[derive(Clone, Debug)]
pub struct Rng {
    inner: StdRng,
}

impl Rng {
    /// Seeds from OS entropy via `rand::thread_rng()`.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_rng(rand::thread_rng()).expect("OS entropy source unavailable"),
        }
    }

    /// Deterministic construction for tests and reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in `[lo, hi]` for any float scalar.
    pub fn uniform<T: Float>(&mut self, lo: T, hi: T) -> T {
        let span = hi - lo;
        let sample: f64 = self.inner.gen_range(0.0..=1.0);
        lo + span * T::from(sample).unwrap_or_else(T::zero)
    }

    /// Uniform integer draw in `[lo, hi]` inclusive.
    pub fn uniform_usize(&mut self, lo: usize, hi: usize) -> usize {
        self.inner.gen_range(lo..=hi)
    }

    /// Bernoulli draw: `true` with probability `p`.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Gaussian draw with the given mean/variance.
    pub fn gaussian<T: Float>(&mut self, mean: T, variance: T) -> T {
        let std_dev = variance.max(T::zero()).sqrt().to_f64().unwrap_or(0.0);
        let mean_f = mean.to_f64().unwrap_or(0.0);
        let dist = Normal::new(mean_f, std_dev).unwrap_or_else(|_| Normal::new(mean_f, 1e-12).unwrap());
        T::from(dist.sample(&mut self.inner)).unwrap_or(mean)
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = Rng::from_seed(42);
        for _ in 0..1000 {
            let v = rng.uniform(-0.5f64, 0.5f64);
            assert!((-0.5..=0.5).contains(&v));
        }
    }

    #[test]
    fn uniform_usize_inclusive_bounds() {
        let mut rng = Rng::from_seed(7);
        let mut saw_hi = false;
        for _ in 0..200 {
            let v = rng.uniform_usize(1, 3);
            assert!((1..=3).contains(&v));
            if v == 3 {
                saw_hi = true;
            }
        }
        assert!(saw_hi);
    }

    #[test]
    fn seeded_rngs_are_reproducible() {
        let mut a = Rng::from_seed(99);
        let mut b = Rng::from_seed(99);
        for _ in 0..50 {
            assert_eq!(a.uniform(0.0f64, 1.0f64), b.uniform(0.0f64, 1.0f64));
        }
    }
}
