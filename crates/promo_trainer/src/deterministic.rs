//! Deterministic randomness for reproducible training
//!
//! Provides a seeded LCG, per-tree seed derivation, index shuffling and
//! bootstrap sampling so that a given seed always yields the same split and
//! the same forest, whatever the thread scheduling.

use std::num::Wrapping;

/// 64-bit linear congruential generator (Knuth MMIX constants)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: Wrapping(mix_seed(seed, 0)),
        };
        rng.next_u32();
        rng
    }

    /// Next 32 pseudo-random bits (high half of the state)
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 >> 32) as u32
    }

    /// Uniform value in `[0, bound)`, 0 when `bound` is 0
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (((hi << 32) | lo) % bound as u64) as usize
    }
}

/// Derive an independent seed for `stream` from a base seed (splitmix64 finalizer)
pub fn mix_seed(seed: u64, stream: u64) -> u64 {
    let mut z = seed
        .wrapping_add(stream.wrapping_mul(0x9E3779B97F4A7C15))
        .wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Fisher-Yates permutation of `0..n`
pub fn shuffled_indices(n: usize, rng: &mut LcgRng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.next_below(i + 1);
        indices.swap(i, j);
    }
    indices
}

/// `n` draws with replacement from `0..n`
pub fn bootstrap_indices(n: usize, rng: &mut LcgRng) -> Vec<usize> {
    (0..n).map(|_| rng.next_below(n)).collect()
}
