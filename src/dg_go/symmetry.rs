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

//! The eight dihedral transforms used to augment feature tensors and
//! un-augment policy tensors at inference time.

/// One of the eight elements of the dihedral group of the square.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Symmetry {
    Identity,
    Rot90,
    Rot180,
    Rot270,
    FlipHorizontal,
    Transpose,
    FlipVertical,
    AntiTranspose,
}

impl Symmetry {
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rot90,
        Symmetry::Rot180,
        Symmetry::Rot270,
        Symmetry::FlipHorizontal,
        Symmetry::Transpose,
        Symmetry::FlipVertical,
        Symmetry::AntiTranspose,
    ];

    pub fn inverse(self) -> Symmetry {
        match self {
            Symmetry::Identity => Symmetry::Identity,
            Symmetry::Rot90 => Symmetry::Rot270,
            Symmetry::Rot180 => Symmetry::Rot180,
            Symmetry::Rot270 => Symmetry::Rot90,
            Symmetry::FlipHorizontal => Symmetry::FlipHorizontal,
            Symmetry::Transpose => Symmetry::Transpose,
            Symmetry::FlipVertical => Symmetry::FlipVertical,
            Symmetry::AntiTranspose => Symmetry::AntiTranspose,
        }
    }

    /// Where `(x, y)` lands when this symmetry is applied to an `size x
    /// size` board.
    fn transform_xy(self, x: u8, y: u8, size: u8) -> (u8, u8) {
        let last = size - 1;

        match self {
            Symmetry::Identity => (x, y),
            Symmetry::Rot90 => (y, last - x),
            Symmetry::Rot180 => (last - x, last - y),
            Symmetry::Rot270 => (last - y, x),
            Symmetry::FlipHorizontal => (last - x, y),
            Symmetry::Transpose => (y, x),
            Symmetry::FlipVertical => (x, last - y),
            Symmetry::AntiTranspose => (last - y, last - x),
        }
    }

    /// Applies this symmetry to a single `size x size` plane, row-major.
    pub fn apply_plane(self, input: &[f32], size: u8) -> Vec<f32> {
        let n = size as usize;
        debug_assert_eq!(input.len(), n * n);

        let inv = self.inverse();
        let mut output = vec![0.0; n * n];

        for y in 0..size {
            for x in 0..size {
                let (sx, sy) = inv.transform_xy(x, y, size);
                output[y as usize * n + x as usize] = input[sy as usize * n + sx as usize];
            }
        }

        output
    }

    /// Applies this symmetry to a `size*size + 1` policy vector, leaving
    /// the trailing pass/resign slot(s) untouched.
    pub fn apply_policy(self, policy: &[f32], size: u8) -> Vec<f32> {
        let area = size as usize * size as usize;
        debug_assert!(policy.len() >= area);

        let mut output = policy.to_vec();
        let transformed = self.apply_plane(&policy[..area], size);
        output[..area].copy_from_slice(&transformed);
        output
    }

    /// Chooses a position-dependent symmetry: `MixBits(stone_hash *
    /// LargePrime + player_mix) mod 8`, deterministic per `(player,
    /// position)`.
    pub fn from_hash(stone_hash: u64, player_mix: u64) -> Symmetry {
        const LARGE_PRIME: u64 = 0x9E37_79B9_7F4A_7C15;

        let mixed = mix_bits(stone_hash.wrapping_mul(LARGE_PRIME).wrapping_add(player_mix));
        Symmetry::ALL[(mixed % 8) as usize]
    }
}

/// The splitmix64 finalizer: a cheap, well-distributed 64-bit avalanche.
fn mix_bits(mut z: u64) -> u64 {
    z ^= z >> 33;
    z = z.wrapping_mul(0xff51_afd7_ed55_8ccd);
    z ^= z >> 33;
    z = z.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    z ^= z >> 33;
    z
}
