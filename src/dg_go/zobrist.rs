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

//! The process-wide Zobrist table. Filled from a seeded RNG exactly once,
//! explicitly, before any `Position` is constructed -- this table is never
//! lazily initialized, so that the moment of initialization (and therefore
//! the seed in effect) is always visible at the call site.

use crate::color::Color;
use crate::point::{Point, MAX_NUM_POINTS};
use dg_utils::random::Random;
use rand::RngCore;
use std::sync::OnceLock;

struct ZobristTable {
    black_to_play: u64,
    opponent_passed: u64,
    move_hash: Vec<[u64; 3]>,
    ko_hash: Vec<u64>,
    illegal_empty_point_hash: Vec<u64>,
}

static TABLE: OnceLock<ZobristTable> = OnceLock::new();

fn build_table(seed: u64) -> ZobristTable {
    let mut rng = Random::new(seed, 1);
    let mut next = || rng.next_u64();

    let mut move_hash = Vec::with_capacity(MAX_NUM_POINTS);
    let mut ko_hash = Vec::with_capacity(MAX_NUM_POINTS);
    let mut illegal_empty_point_hash = Vec::with_capacity(MAX_NUM_POINTS);

    for _ in 0..MAX_NUM_POINTS {
        move_hash.push([0u64, next(), next()]);
        ko_hash.push(next());
        illegal_empty_point_hash.push(next());
    }

    ZobristTable {
        black_to_play: next(),
        opponent_passed: next(),
        move_hash,
        ko_hash,
        illegal_empty_point_hash,
    }
}

/// Fills the global Zobrist table from `seed`. Must be called exactly once,
/// before the first `Position` is constructed. Calling it a second time is a
/// precondition violation.
pub fn init(seed: u64) {
    TABLE
        .set(build_table(seed))
        .unwrap_or_else(|_| panic!("zobrist::init called more than once"));
}

/// Ensures the table is initialized, using a fixed seed, for callers (tests,
/// simple demos) that do not care about reproducing a specific seed but
/// still need the table filled before constructing a `Position`.
pub fn ensure_initialized() {
    TABLE.get_or_init(|| build_table(0x5EED_0000_D6_D6_u64));
}

fn table() -> &'static ZobristTable {
    TABLE
        .get()
        .expect("zobrist::init(seed) must be called before use")
}

pub fn black_to_play() -> u64 {
    table().black_to_play
}

pub fn opponent_passed() -> u64 {
    table().opponent_passed
}

pub fn move_hash(point: Point, color: Color) -> u64 {
    table().move_hash[point.index()][color as usize]
}

pub fn ko_hash(point: Point) -> u64 {
    table().ko_hash[point.index()]
}

pub fn illegal_empty_point_hash(point: Point) -> u64 {
    table().illegal_empty_point_hash[point.index()]
}
