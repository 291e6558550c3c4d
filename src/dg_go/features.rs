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

//! Builds the 17-plane feature tensor the model consumes: 8 pairs of
//! (my-color, opponent) board snapshots, most recent first, plus a
//! constant side-to-play plane.

use crate::color::Color;
use crate::point::Point;
use crate::position::Position;
use dg_utils::types::f16;

pub const NUM_FEATURE_PLANES: usize = 17;
const NUM_HISTORY_PAIRS: usize = 8;

/// A `[N, N, 17]` feature tensor (stored plane-major: `plane * area + y *
/// size + x`).
#[derive(Debug, Clone)]
pub struct Features {
    size: u8,
    planes: Vec<f16>,
}

impl Features {
    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn as_slice(&self) -> &[f16] {
        &self.planes
    }

    /// Builds the feature tensor for a position with no prior history: all
    /// 8 history slots show the same, current, board.
    pub fn initialize(position: &Position) -> Features {
        let size = position.size();
        let area = position.area();
        let mut planes = vec![f16::from_f32(0.0); NUM_FEATURE_PLANES * area];

        let mine = position.to_play();
        let theirs = mine.opposite();

        for pair in 0..NUM_HISTORY_PAIRS {
            write_stone_plane(&mut planes, pair * 2, position, mine, size, area);
            write_stone_plane(&mut planes, pair * 2 + 1, position, theirs, size, area);
        }

        fill_side_to_play_plane(&mut planes, mine, area);

        Features { size, planes }
    }

    /// Advances `self` (the previous buffer) to `position`: shifts each
    /// history pair two slots back, swapping which half of the pair is
    /// "mine" (since the side to play has just flipped), then writes the
    /// new position into planes 0 and 1.
    pub fn update(&self, position: &Position) -> Features {
        let size = self.size;
        let area = size as usize * size as usize;
        let mut planes = vec![f16::from_f32(0.0); NUM_FEATURE_PLANES * area];

        for pair in 0..(NUM_HISTORY_PAIRS - 1) {
            let old_mine = pair * 2;
            let old_theirs = pair * 2 + 1;
            let new_mine = (pair + 1) * 2;
            let new_theirs = (pair + 1) * 2 + 1;

            // The side to play flips, so the old "mine" plane becomes the
            // new "theirs" plane at the shifted slot, and vice versa.
            copy_plane(&self.planes, old_mine, &mut planes, new_theirs, area);
            copy_plane(&self.planes, old_theirs, &mut planes, new_mine, area);
        }

        let mine = position.to_play();
        let theirs = mine.opposite();
        write_stone_plane(&mut planes, 0, position, mine, size, area);
        write_stone_plane(&mut planes, 1, position, theirs, size, area);
        fill_side_to_play_plane(&mut planes, mine, area);

        Features { size, planes }
    }
}

fn write_stone_plane(planes: &mut [f16], plane_index: usize, position: &Position, color: Color, size: u8, area: usize) {
    let base = plane_index * area;
    for point in Point::all(size) {
        let value = if position.stone_at(point) == color { 1.0 } else { 0.0 };
        planes[base + point.index()] = f16::from_f32(value);
    }
}

fn fill_side_to_play_plane(planes: &mut [f16], mine: Color, area: usize) {
    let value = if mine == Color::Black { 1.0 } else { 0.0 };
    let base = (NUM_FEATURE_PLANES - 1) * area;
    for slot in planes[base..base + area].iter_mut() {
        *slot = f16::from_f32(value);
    }
}

fn copy_plane(src: &[f16], src_plane: usize, dst: &mut [f16], dst_plane: usize, area: usize) {
    let src_base = src_plane * area;
    let dst_base = dst_plane * area;
    dst[dst_base..dst_base + area].copy_from_slice(&src[src_base..src_base + area]);
}
