//! Seedable random source
//!
//! All randomness in a run flows from one seedable generator so that a fixed
//! seed reproduces the same windows, the same class assignments, and the same
//! per-session jitter regardless of task interleaving. Each session gets its
//! own child generator derived from the master stream.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use std::time::Duration;

/// The run's master random source.
pub struct RandomSource {
    rng: ChaCha8Rng,
    seed: u64,
}

impl RandomSource {
    /// Create a source from an explicit seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a source from OS entropy, remembering the drawn seed so the run
    /// can still be reported (and replayed) by seed
    pub fn from_entropy() -> Self {
        let seed = rand::rngs::OsRng.next_u64();
        Self::from_seed(seed)
    }

    /// The seed this source was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent child seed for one session.
    ///
    /// Sessions seeded this way are deterministic under a fixed run seed no
    /// matter how the worker pool interleaves them.
    pub fn child_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Direct access to the master generator (window planning, shuffling)
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

/// Draw a uniform duration in `[min_ms, max_ms]` milliseconds.
///
/// This is the jitter primitive behind dwell and inter-interaction delays;
/// a degenerate range collapses to its minimum without consuming randomness.
pub fn uniform_ms(rng: &mut impl Rng, min_ms: u64, max_ms: u64) -> Duration {
    let drawn = if min_ms >= max_ms {
        min_ms
    } else {
        Uniform::new_inclusive(min_ms, max_ms).sample(rng)
    };
    Duration::from_millis(drawn)
}
