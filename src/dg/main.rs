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

//! A minimal self-play driver. Flag parsing, the GTP command loop, and
//! model loading are external collaborators (see the design notes); this
//! binary only wires a `Player` to a stand-in predictor and plays a single
//! game to completion so the core libraries can be exercised end-to-end.

use dg_go::{coord, zobrist, Color, Position};
use dg_mcts::player::{Options, Player};
use dg_nn::predictor::RandomPredictor;

const BOARD_SIZE: u8 = 9;

fn main() {
    zobrist::ensure_initialized();

    let predictor = RandomPredictor::new(BOARD_SIZE);
    let options = Options::default();
    let mut player = Player::new(&predictor, options, Position::new(BOARD_SIZE));

    let readouts = *dg_utils::config::NUM_ROLLOUT;
    let max_moves = 2 * BOARD_SIZE as usize * BOARD_SIZE as usize;

    for _ in 0..max_moves {
        if player.tree().is_terminal(player.tree().root()) {
            break;
        }

        if player.should_resign() {
            let resigning = player.tree().root_node().position().to_play();
            println!("{:?} resigns", resigning);
            return;
        }

        let mv = player.suggest_move(readouts);
        println!("{:?} {}", move_color(&player), coord::format_gtp(mv, BOARD_SIZE));
        player.play_move(mv);
    }

    let position = player.tree().root_node().position();
    let score = position.calculate_score(player.options().komi);
    let winner = if score > 0.0 { Color::Black } else { Color::White };
    println!("{:?} wins by {:.1}", winner, score.abs());
}

fn move_color(player: &Player<'_>) -> Color {
    player.tree().root_node().position().to_play()
}
