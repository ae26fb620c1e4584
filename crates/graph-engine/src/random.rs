//! Thread-local random source shared by every sampler.

use std::cell::RefCell;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

thread_local! {
    static RNG: RefCell<Pcg64> = RefCell::new(Pcg64::from_rng(&mut rand::rng()));
}

/// Reseeds the calling thread's generator.
pub fn reseed(seed: u64) {
    RNG.with(|rng| *rng.borrow_mut() = Pcg64::seed_from_u64(seed));
}

/// Uniform draw from `[0, 1)`.
#[inline]
pub fn random_unit() -> f64 {
    RNG.with(|rng| rng.borrow_mut().random::<f64>())
}

/// Uniform draw from `0..n`. `n` must be non-zero.
#[inline]
pub fn random_index(n: usize) -> usize {
    debug_assert!(n > 0);
    RNG.with(|rng| rng.borrow_mut().random_range(0..n.max(1)))
}
