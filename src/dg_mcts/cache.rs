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

//! A bounded, per-player inference cache. Not shared across players by
//! default -- wrap in a lock or a concurrent map to do so.
//!
//! The cache key includes `opponent_passed` alongside `(stone_hash, ko,
//! to_play)`: two positions that are identical on the board but differ in
//! "the previous move was a pass" must not collide, since a pass changes
//! whether the *next* move ends the game. `stone_hash` itself stays exactly
//! the XOR of placed stones (per the Position invariant), so the pass bit is
//! folded into the cache key rather than into the hash.

use dg_go::{Color, Point};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
struct CacheKey {
    stone_hash: u64,
    ko: Point,
    to_play: Color,
    opponent_passed: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    policy: Vec<f32>,
    value: f32,
    touch: u64,
}

/// An LRU-by-logical-touch-order cache from position key to `(policy,
/// value)`. Capacity is a count of entries, derived by the caller from a
/// byte budget (entry size depends on board area).
pub struct InferenceCache {
    entries: HashMap<CacheKey, Entry>,
    capacity: usize,
    clock: u64,
}

impl InferenceCache {
    pub fn with_capacity(capacity: usize) -> InferenceCache {
        InferenceCache { entries: HashMap::new(), capacity, clock: 0 }
    }

    /// Derives a capacity from a byte budget, given the per-entry size in
    /// floats (`area + 1` policy entries plus the value scalar).
    pub fn with_byte_budget(byte_budget: usize, area: usize) -> InferenceCache {
        let bytes_per_entry = (area + 2) * std::mem::size_of::<f32>();
        let capacity = (byte_budget / bytes_per_entry.max(1)).max(1);

        InferenceCache::with_capacity(capacity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(
        &mut self,
        stone_hash: u64,
        ko: Point,
        to_play: Color,
        opponent_passed: bool,
    ) -> Option<(Vec<f32>, f32)> {
        let key = CacheKey { stone_hash, ko, to_play, opponent_passed };
        self.clock += 1;
        let clock = self.clock;

        self.entries.get_mut(&key).map(|entry| {
            entry.touch = clock;
            (entry.policy.clone(), entry.value)
        })
    }

    pub fn insert(
        &mut self,
        stone_hash: u64,
        ko: Point,
        to_play: Color,
        opponent_passed: bool,
        policy: Vec<f32>,
        value: f32,
    ) {
        if self.entries.len() >= self.capacity && self.capacity > 0 {
            self.evict_least_recently_touched();
        }
        if self.capacity == 0 {
            return;
        }

        self.clock += 1;
        let key = CacheKey { stone_hash, ko, to_play, opponent_passed };
        self.entries.insert(key, Entry { policy, value, touch: self.clock });
    }

    fn evict_least_recently_touched(&mut self) {
        if let Some((&lru_key, _)) = self.entries.iter().min_by_key(|(_, entry)| entry.touch) {
            self.entries.remove(&lru_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let mut cache = InferenceCache::with_capacity(4);
        let ko = Point::invalid();

        assert!(cache.get(1, ko, Color::Black, false).is_none());
        cache.insert(1, ko, Color::Black, false, vec![0.5, 0.5], 0.1);
        let (policy, value) = cache.get(1, ko, Color::Black, false).unwrap();

        assert_eq!(policy, vec![0.5, 0.5]);
        assert_eq!(value, 0.1);
    }

    #[test]
    fn pass_bit_distinguishes_otherwise_identical_keys() {
        let mut cache = InferenceCache::with_capacity(4);
        let ko = Point::invalid();

        cache.insert(1, ko, Color::Black, false, vec![1.0], 0.0);
        assert!(cache.get(1, ko, Color::Black, true).is_none());
    }

    #[test]
    fn eviction_drops_the_least_recently_touched_entry() {
        let mut cache = InferenceCache::with_capacity(2);
        let ko = Point::invalid();

        cache.insert(1, ko, Color::Black, false, vec![1.0], 0.0);
        cache.insert(2, ko, Color::Black, false, vec![1.0], 0.0);
        cache.get(1, ko, Color::Black, false);
        cache.insert(3, ko, Color::Black, false, vec![1.0], 0.0);

        assert!(cache.get(1, ko, Color::Black, false).is_some());
        assert!(cache.get(2, ko, Color::Black, false).is_none());
        assert!(cache.get(3, ko, Color::Black, false).is_some());
    }
}
