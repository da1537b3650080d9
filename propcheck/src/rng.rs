//! Seeded random streams.
//!
//! Every property run owns exactly one [`ValueSource`]: a generator bound to a
//! private `StdRng`. The seed that built the stream is reported back in the
//! test result, so a failing run can be replayed with
//! [`TestConfig::with_seed`](crate::config::TestConfig::with_seed).

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::generator::{BoxedGenerator, Generator};

/// Create an RNG with a specific seed
pub fn create_seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Use the configured seed, or draw a fresh one
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// Derive an independent seed for a parallel worker (splitmix64 finalizer)
pub fn derive_worker_seed(seed: u64, worker: usize) -> u64 {
    let mut z = seed.wrapping_add((worker as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A generator bound to its own pseudorandom stream
#[derive(Debug)]
pub struct ValueSource<T> {
    generator: BoxedGenerator<T>,
    config: GeneratorConfig,
    rng: StdRng,
    draws: u64,
}

impl<T> ValueSource<T> {
    pub fn new(generator: BoxedGenerator<T>, config: GeneratorConfig, seed: u64) -> Self {
        Self {
            generator,
            config,
            rng: create_seeded_rng(seed),
            draws: 0,
        }
    }

    /// Pull the next value from the stream
    pub fn next(&mut self) -> Result<T, GenerationError> {
        self.draws += 1;
        self.generator.generate(&mut self.rng, &self.config)
    }

    /// Number of values pulled so far
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::int_range;
    use rand::Rng;

    #[test]
    fn test_seeded_rngs_agree() {
        let mut first = create_seeded_rng(555);
        let mut second = create_seeded_rng(555);
        let a: u32 = first.r#gen();
        let b: u32 = second.r#gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_seed() {
        assert_eq!(resolve_seed(Some(42)), 42);
        // Fresh seeds are random; two in a row colliding is vanishingly unlikely
        assert_ne!(resolve_seed(None), resolve_seed(None));
    }

    #[test]
    fn test_worker_seeds_are_distinct() {
        let seeds: std::collections::HashSet<u64> =
            (0..64).map(|worker| derive_worker_seed(7, worker)).collect();
        assert_eq!(seeds.len(), 64);
        assert_eq!(derive_worker_seed(7, 3), derive_worker_seed(7, 3));
        assert_ne!(derive_worker_seed(7, 3), derive_worker_seed(8, 3));
    }

    #[test]
    fn test_value_source_replays() {
        let generator = int_range(0, 1_000_000).boxed();
        let mut first = ValueSource::new(generator.clone(), GeneratorConfig::default(), 99);
        let mut second = ValueSource::new(generator, GeneratorConfig::default(), 99);

        let a: Vec<i32> = (0..20).map(|_| first.next().unwrap()).collect();
        let b: Vec<i32> = (0..20).map(|_| second.next().unwrap()).collect();
        assert_eq!(a, b);
        assert_eq!(first.draws(), 20);
        assert_eq!(second.draws(), 20);
    }
}
