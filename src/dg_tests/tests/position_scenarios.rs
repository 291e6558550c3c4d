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

use dg_go::position::MoveClass;
use dg_go::{coord, zobrist, Color, Point, Position};

fn setup() {
    zobrist::ensure_initialized();
}

/// The `D5 D6 E6 E5 F5 C5 D4` sequence, driven through the GTP coordinate
/// parser rather than raw `(x, y)` pairs: D5 is captured by White's last
/// move and never becomes a ko point (the captured shape is not a
/// single-stone eye). D5's four neighbors are D6, E5, C5, and D4, so the
/// capture needs all four to be White -- not a strict B/W/B/W alternation,
/// which would instead play D4 as Black and merge it into D5's own group.
#[test]
fn simple_capture_via_gtp_coordinates() {
    setup();
    let size = 9;
    let mut position = Position::new(size);

    let moves = [
        ("D5", Color::Black),
        ("D6", Color::White),
        ("E6", Color::Black),
        ("E5", Color::White),
        ("F5", Color::Black),
        ("C5", Color::White),
        ("D4", Color::White),
    ];
    for (coord_str, color) in moves {
        let point = coord::parse_gtp(coord_str, size).expect("valid GTP coordinate");
        position.play_move_as(point, color);
    }

    let d5 = coord::parse_gtp("D5", size).unwrap();
    assert_eq!(position.stone_at(d5), Color::Empty);
    assert_eq!(position.num_captures(Color::White), 1);
    assert_eq!(position.ko(), Point::invalid());
}

/// A hand-verified single-stone ko: a lone white stone with exactly one
/// liberty, captured by a black stone that itself ends up with exactly one
/// liberty (the vacated point) -- the textbook shape that sets `ko`.
#[test]
fn capturing_into_a_one_liberty_eye_sets_the_ko_point() {
    setup();
    let size = 9;
    let mut position = Position::new(size);

    let c = Point::from_xy(4, 4, size); // the stone about to be captured
    let p = Point::from_xy(3, 4, size); // the recapturing point

    // `c`'s other three neighbors: black, so `c` has exactly one liberty (p).
    position.play_move_as(Point::from_xy(4, 3, size), Color::Black);
    position.play_move_as(Point::from_xy(4, 5, size), Color::Black);
    position.play_move_as(Point::from_xy(5, 4, size), Color::Black);

    // `p`'s other three neighbors: white, so the recapturing stone at `p`
    // ends up with exactly one liberty (the vacated `c`) and does not merge
    // with a larger black group.
    position.play_move_as(Point::from_xy(3, 3, size), Color::White);
    position.play_move_as(Point::from_xy(3, 5, size), Color::White);
    position.play_move_as(Point::from_xy(2, 4, size), Color::White);

    position.play_move_as(c, Color::White);

    assert_eq!(
        position.classify_move_ignoring_superko_as(p, Color::Black),
        MoveClass::Capture
    );

    // play_move_as always leaves `to_play` as the opposite of whatever was
    // just placed; after placing White at `c`, it is Black's turn, matching
    // the capturing side.
    assert_eq!(position.to_play(), Color::Black);
    position.play_move(p);

    assert_eq!(position.stone_at(c), Color::Empty);
    assert_eq!(position.ko(), c);
    assert!(!position.is_legal(c));

    // Any other legal move -- a pass suffices -- clears the ko point.
    position.play_move(Point::pass(size));
    assert_eq!(position.ko(), Point::invalid());
}

/// Two single stones with nothing else on the board: the rest of the board
/// is one connected empty region bordering both colors, so it is neutral
/// ("dame") rather than territory for either side.
#[test]
fn a_region_touching_both_colors_scores_as_neutral() {
    setup();
    let size = 9;
    let mut position = Position::new(size);

    position.play_move_as(Point::from_xy(0, 0, size), Color::Black);
    position.play_move_as(Point::from_xy(2, 0, size), Color::White);

    assert_eq!(position.calculate_score(7.5), 1.0 - 1.0 - 7.5);
}

/// Legal-move soundness and capture accounting, checked after a short,
/// deterministic sequence that includes a capture.
#[test]
fn legality_and_capture_accounting_hold_after_a_capture() {
    setup();
    let size = 9;
    let mut position = Position::new(size);
    let mut stones_placed = 0u32;

    let moves = [
        ("D5", Color::Black),
        ("D6", Color::White),
        ("E6", Color::Black),
        ("E5", Color::White),
        ("F5", Color::Black),
        ("C5", Color::White),
        ("D4", Color::White),
    ];
    for (coord_str, color) in moves {
        let point = coord::parse_gtp(coord_str, size).unwrap();
        position.play_move_as(point, color);
        stones_placed += 1;
    }

    for point in Point::all(size) {
        if position.is_legal(point) {
            let class = position.classify_move_ignoring_superko_as(point, position.to_play());
            assert_ne!(class, MoveClass::Illegal, "a legal move must not classify as illegal");
        }
    }

    let stones_on_board =
        Point::all(size).filter(|&p| position.stone_at(p) != Color::Empty).count() as u32;
    let total_captured = position.num_captures(Color::Black) + position.num_captures(Color::White);

    assert_eq!(total_captured, stones_placed - stones_on_board);
}
