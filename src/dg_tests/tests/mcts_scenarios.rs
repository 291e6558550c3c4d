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

use dg_go::{zobrist, Point, Position};
use dg_mcts::player::{Options, Player};
use dg_mcts::Tree;
use dg_nn::{Inference, Predictor, Request};

fn setup() {
    zobrist::ensure_initialized();
}

/// Returns a policy sharply peaked on one on-board point, otherwise
/// uniform, value always zero. Deterministic and independent of the
/// requested features, so PUCT search reliably concentrates visits on the
/// favored point.
#[derive(Clone)]
struct PeakedPredictor {
    num_outputs: usize,
    favored_index: usize,
}

impl PeakedPredictor {
    fn new(size: u8, favored: Point) -> PeakedPredictor {
        PeakedPredictor {
            num_outputs: size as usize * size as usize + 1,
            favored_index: favored.index(),
        }
    }
}

impl Predictor for PeakedPredictor {
    fn predict(&self, batch: &[Request]) -> Vec<Inference> {
        let rest = 0.1 / (self.num_outputs - 1) as f32;
        let mut policy = vec![rest; self.num_outputs];
        policy[self.favored_index] = 0.9;

        batch.iter().map(|_| Inference { policy: policy.clone(), value: 0.0 }).collect()
    }

    fn name(&self) -> &str {
        "peaked"
    }

    fn new_instance(&self) -> Box<dyn Predictor> {
        Box::new(self.clone())
    }
}

/// With a strongly peaked prior and noise disabled, argmax pick-move
/// converges on the favored point: PUCT's U term is driven by `P`, so the
/// favored child is selected as the leaf on (almost) every batch and
/// accumulates the largest visit count by a wide margin.
#[test]
fn argmax_pick_prefers_the_highest_prior_move() {
    setup();
    let size = 9;
    let favored = Point::from_xy(4, 4, size);
    let predictor = PeakedPredictor::new(size, favored);

    let options = Options {
        inject_noise: false,
        soft_pick: false,
        random_symmetry: false,
        virtual_losses: 4,
        ..Options::default()
    };
    let mut player = Player::new(&predictor, options, Position::new(size));

    let mv = player.suggest_move(128);
    assert_eq!(mv, favored);
}

/// Soft pick (early-game temperature sampling) never returns pass while any
/// on-board move has been visited, and tends to favor the highest-prior
/// move across repeated independent searches.
#[test]
fn soft_pick_never_returns_pass_and_favors_the_peak() {
    setup();
    let size = 9;
    let favored = Point::from_xy(2, 6, size);
    let predictor = PeakedPredictor::new(size, favored);

    let mut favored_count = 0;
    let trials = 20;

    for seed in 1..=trials {
        let options = Options {
            inject_noise: false,
            soft_pick: true,
            random_symmetry: false,
            virtual_losses: 4,
            random_seed: seed,
            ..Options::default()
        };
        let mut player = Player::new(&predictor, options, Position::new(size));

        let mv = player.suggest_move(64);
        assert!(!mv.is_pass(size), "soft pick returned pass with on-board moves visited");
        if mv == favored {
            favored_count += 1;
        }
    }

    assert!(
        favored_count * 2 > trials,
        "expected the heavily-favored move to win a majority of soft-pick draws, got {}/{}",
        favored_count,
        trials
    );
}

/// At the `Tree` level: applying 8 virtual losses and reverting all 8
/// leaves every edge's `N` and every node's virtual-loss counter back to
/// its pre-batch value, exactly -- not just net zero by coincidence.
#[test]
fn virtual_losses_cancel_exactly_after_a_full_batch() {
    setup();
    let mut tree = Tree::new(Position::new(9));
    let root = tree.root();
    let num_slots = tree.node(root).edges().len();
    let policy = vec![1.0 / num_slots as f32; num_slots];
    tree.incorporate_results(root, &policy, 0.0, root);

    let n_parent_before: u32 = tree.node(root).edges().iter().map(|e| e.n).sum();
    let w_parent_before: f32 = tree.node(root).edges().iter().map(|e| e.w).sum();
    assert_eq!(n_parent_before, 0);

    let mut leaves = Vec::new();
    for _ in 0..8 {
        let leaf = tree.select_leaf(1.5, 0.0);
        tree.add_virtual_loss(leaf, root);
        leaves.push(leaf);
    }

    let n_parent_mid: u32 = tree.node(root).edges().iter().map(|e| e.n).sum();
    assert_eq!(n_parent_mid, n_parent_before + 8);

    for &leaf in &leaves {
        tree.revert_virtual_loss(leaf, root);
    }

    let n_parent_after: u32 = tree.node(root).edges().iter().map(|e| e.n).sum();
    let w_parent_after: f32 = tree.node(root).edges().iter().map(|e| e.w).sum();
    assert_eq!(n_parent_after, n_parent_before);
    assert!((w_parent_after - w_parent_before).abs() < 1e-6);

    for leaf in leaves {
        assert_eq!(tree.node(leaf).num_virtual_losses_applied(), 0);
    }
}
