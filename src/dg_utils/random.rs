// Copyright 2024 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A seeded PCG-32 generator with an explicit `(seed, stream)` split, so that
//! two `Random` instances constructed with the same seed but different
//! streams produce uncorrelated sequences while the same `(seed, stream)`
//! pair is always reproducible.

use rand::distributions::Distribution;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Dirichlet, Normal};
use rand_pcg::Pcg32;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter used to allocate a fresh stream when the caller asks
/// for stream `0`. Starts at `1` since `0` is reserved for "allocate one".
static NEXT_STREAM: AtomicU64 = AtomicU64::new(1);

/// A seeded, reproducible random number generator.
///
/// A seed of `0` means "derive a seed from platform entropy". A stream of
/// `0` means "allocate a fresh stream from the process-wide counter". Any
/// other `(seed, stream)` pair is fully deterministic.
pub struct Random {
    rng: Pcg32,
}

impl Random {
    pub fn new(seed: u64, stream: u64) -> Self {
        let seed = if seed == 0 { rand::thread_rng().gen() } else { seed };
        let stream = if stream == 0 {
            NEXT_STREAM.fetch_add(1, Ordering::Relaxed)
        } else {
            stream
        };

        Self { rng: Pcg32::new(seed, stream) }
    }

    /// Returns a generator seeded from platform entropy with a fresh stream.
    /// Equivalent to `Random::new(0, 0)`.
    pub fn from_entropy() -> Self {
        Self::new(0, 0)
    }

    /// Returns a uniform float in `[0, 1)`.
    pub fn uniform(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Returns a uniform integer in the closed range `[low, high]`.
    pub fn uniform_range(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }

    /// Samples from a normal distribution with the given mean and standard
    /// deviation.
    pub fn normal(&mut self, mean: f32, std_dev: f32) -> f32 {
        Normal::new(mean, std_dev)
            .expect("normal distribution requires a non-negative standard deviation")
            .sample(&mut self.rng)
    }

    /// Samples a vector from a symmetric `Dirichlet(alpha, .., alpha)`
    /// distribution of the given dimension.
    pub fn dirichlet(&mut self, alpha: f32, dimension: usize) -> Vec<f32> {
        if dimension == 0 {
            return Vec::new();
        } else if dimension == 1 {
            return vec! [1.0];
        }

        Dirichlet::new(&vec! [alpha; dimension])
            .expect("dirichlet distribution requires alpha > 0")
            .sample(&mut self.rng)
    }

    /// Shuffles `slice` in-place using a Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;

        slice.shuffle(&mut self.rng);
    }
}

impl RngCore for Random {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_and_stream_is_reproducible() {
        let mut a = Random::new(42, 7);
        let mut b = Random::new(42, 7);

        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_streams_diverge() {
        let mut a = Random::new(42, 1);
        let mut b = Random::new(42, 2);

        let seq_a: Vec<u32> = (0..16).map(|_| a.next_u32()).collect();
        let seq_b: Vec<u32> = (0..16).map(|_| b.next_u32()).collect();

        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn uniform_is_within_bounds() {
        let mut rng = Random::new(1, 1);

        for _ in 0..10_000 {
            let x = rng.uniform();
            assert!(x >= 0.0 && x < 1.0);
        }
    }

    #[test]
    fn uniform_range_is_closed() {
        let mut rng = Random::new(1, 1);
        let mut saw_low = false;
        let mut saw_high = false;

        for _ in 0..10_000 {
            let x = rng.uniform_range(-3, 3);
            assert!(x >= -3 && x <= 3);
            saw_low |= x == -3;
            saw_high |= x == 3;
        }

        assert!(saw_low && saw_high);
    }

    #[test]
    fn dirichlet_sums_to_one() {
        let mut rng = Random::new(1, 1);
        let sample = rng.dirichlet(0.03, 362);

        assert_eq!(sample.len(), 362);

        let sum: f32 = sample.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3, "sum = {}", sum);
    }

    #[test]
    fn zero_seed_or_stream_does_not_panic() {
        let mut rng = Random::new(0, 0);
        let _ = rng.uniform();
    }
}
