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

//! Tromp-Taylor area scoring: every empty region touching only one color
//! counts for that color, plus the stones already on the board.

use crate::color::Color;
use crate::point::Point;
use crate::position::Position;

/// A Tromp-Taylor score from black's perspective: positive favors black.
pub type Score = f32;

pub fn calculate_score(position: &Position, komi: f32) -> f32 {
    let size = position.size();
    let area = position.area();
    let mut visited = vec![false; area];

    let mut black_stones = 0i32;
    let mut white_stones = 0i32;
    let mut black_territory = 0i32;
    let mut white_territory = 0i32;

    for point in Point::all(size) {
        match position.stone_at(point) {
            Color::Black => black_stones += 1,
            Color::White => white_stones += 1,
            Color::Empty => {
                if visited[point.index()] {
                    continue;
                }

                let mut stack = vec![point];
                visited[point.index()] = true;
                let mut members = 0i32;
                let mut touches_black = false;
                let mut touches_white = false;

                while let Some(p) = stack.pop() {
                    members += 1;
                    for neighbor in p.neighbors(size) {
                        match position.stone_at(neighbor) {
                            Color::Empty => {
                                if !visited[neighbor.index()] {
                                    visited[neighbor.index()] = true;
                                    stack.push(neighbor);
                                }
                            }
                            Color::Black => touches_black = true,
                            Color::White => touches_white = true,
                        }
                    }
                }

                if touches_black && !touches_white {
                    black_territory += members;
                } else if touches_white && !touches_black {
                    white_territory += members;
                }
            }
        }
    }

    ((black_stones + black_territory) - (white_stones + white_territory)) as f32 - komi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zobrist;

    #[test]
    fn empty_board_score_is_negative_komi() {
        zobrist::ensure_initialized();
        let position = Position::new(9);
        assert_eq!(calculate_score(&position, 7.5), -7.5);
    }

    #[test]
    fn single_black_stone_scores_whole_board() {
        zobrist::ensure_initialized();
        let mut position = Position::new(9);
        position.play_move(Point::from_xy(4, 4, 9));

        // The single stone plus the entire rest of the board as territory.
        assert_eq!(calculate_score(&position, 0.0), 81.0);
    }
}
