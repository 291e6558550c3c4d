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

/// The three states a point on the board can be in. The numeric values are
/// load-bearing: a stone packs its color into the low two bits next to its
/// group id.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Color {
    Empty = 0,
    Black = 1,
    White = 2,
}

impl Color {
    /// Returns the other player's color. Panics if called on `Empty`.
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => unreachable!("Color::Empty has no opposite"),
        }
    }

    /// `+1` for black, `-1` for white. Used to orient value estimates to a
    /// fixed perspective.
    pub fn sign(self) -> i32 {
        match self {
            Color::Black => 1,
            Color::White => -1,
            Color::Empty => 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Color::Empty
    }
}

impl From<u8> for Color {
    fn from(value: u8) -> Color {
        match value {
            0 => Color::Empty,
            1 => Color::Black,
            2 => Color::White,
            _ => panic!("invalid color value {}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        assert_eq!(Color::Black.opposite(), Color::White);
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Black.opposite().opposite(), Color::Black);
    }

    #[test]
    fn sign_matches_convention() {
        assert_eq!(Color::Black.sign(), 1);
        assert_eq!(Color::White.sign(), -1);
        assert_eq!(Color::Empty.sign(), 0);
    }
}
