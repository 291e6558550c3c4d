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

use std::fmt;

/// The largest supported board edge length. Both 9x9 and 19x19 positions
/// share this constant for sizing fixed arrays.
pub const MAX_BOARD_SIZE: usize = 19;

/// The maximum number of on-board points, used to size fixed-capacity
/// arrays that are shared across board sizes.
pub const MAX_NUM_POINTS: usize = MAX_BOARD_SIZE * MAX_BOARD_SIZE;

/// A point on the board, or one of the two off-board pseudo-moves (`pass`,
/// `resign`), or the sentinel `invalid` value.
///
/// On-board points in `0..size*size` are encoded row-major, row 0 being the
/// top row as stored (callers map this to GTP's bottom-up rows at the
/// coordinate-parsing boundary).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Point(u16);

const INVALID: u16 = 0xFFFF;

impl Point {
    pub fn invalid() -> Point {
        Point(INVALID)
    }

    /// The pass pseudo-move for a board of the given size.
    pub fn pass(size: u8) -> Point {
        Point(size as u16 * size as u16)
    }

    /// The resign pseudo-move for a board of the given size.
    pub fn resign(size: u8) -> Point {
        Point(size as u16 * size as u16 + 1)
    }

    /// Constructs the on-board point at `(x, y)`, `0`-indexed, row-major.
    pub fn from_xy(x: u8, y: u8, size: u8) -> Point {
        debug_assert!(x < size && y < size);

        Point(y as u16 * size as u16 + x as u16)
    }

    /// Constructs a point from its raw encoded index. Does not validate
    /// that `index` is in range for `size`; use only for values already
    /// known to be well-formed (e.g. loop counters).
    pub fn from_index(index: u16) -> Point {
        Point(index)
    }

    pub fn is_invalid(self) -> bool {
        self.0 == INVALID
    }

    pub fn is_pass(self, size: u8) -> bool {
        self.0 == size as u16 * size as u16
    }

    pub fn is_resign(self, size: u8) -> bool {
        self.0 == size as u16 * size as u16 + 1
    }

    pub fn is_on_board(self, size: u8) -> bool {
        self.0 < size as u16 * size as u16
    }

    /// The raw index into `Position::stones` / `legal_moves`. Only
    /// meaningful when `is_on_board` or when indexing `legal_moves` (which
    /// also has a slot for pass).
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn x(self, size: u8) -> u8 {
        debug_assert!(self.is_on_board(size));
        (self.0 % size as u16) as u8
    }

    pub fn y(self, size: u8) -> u8 {
        debug_assert!(self.is_on_board(size));
        (self.0 / size as u16) as u8
    }

    /// The (up to 4) on-board orthogonal neighbors of this point.
    pub fn neighbors(self, size: u8) -> impl Iterator<Item = Point> {
        debug_assert!(self.is_on_board(size));

        let x = self.x(size) as i16;
        let y = self.y(size) as i16;
        let size = size as i16;

        [(-1i16, 0i16), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);

                if nx >= 0 && nx < size && ny >= 0 && ny < size {
                    Some(Point::from_xy(nx as u8, ny as u8, size as u8))
                } else {
                    None
                }
            })
    }

    /// All on-board points of a board of the given size, row-major.
    pub fn all(size: u8) -> impl Iterator<Item = Point> {
        (0..size as u16 * size as u16).map(Point::from_index)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_and_resign_are_distinct_from_board_points() {
        let size = 9;

        for p in Point::all(size) {
            assert!(!p.is_pass(size));
            assert!(!p.is_resign(size));
            assert!(p.is_on_board(size));
        }

        assert!(Point::pass(size).is_pass(size));
        assert!(Point::resign(size).is_resign(size));
        assert!(!Point::pass(size).is_on_board(size));
    }

    #[test]
    fn corner_has_two_neighbors() {
        let size = 9;
        let corner = Point::from_xy(0, 0, size);

        assert_eq!(corner.neighbors(size).count(), 2);
    }

    #[test]
    fn center_has_four_neighbors() {
        let size = 9;
        let center = Point::from_xy(4, 4, size);

        assert_eq!(center.neighbors(size).count(), 4);
    }

    #[test]
    fn xy_round_trips() {
        let size = 19;

        for p in Point::all(size) {
            let (x, y) = (p.x(size), p.y(size));
            assert_eq!(Point::from_xy(x, y, size), p);
        }
    }
}
