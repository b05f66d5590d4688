//! Random bit batch generation
//!
//! The Monte Carlo estimator's source of uniformly distributed 0/1 values.
//! The RNG is caller-owned so every worker draws from its own stream.

use rand::Rng;

use crate::types::BitStream;

/// Generate `count` uniformly distributed bits (0 or 1).
pub fn generate_random_bits<R: Rng>(rng: &mut R, count: usize) -> BitStream {
    (0..count).map(|_| rng.gen_range(0..2u8)).collect()
}
