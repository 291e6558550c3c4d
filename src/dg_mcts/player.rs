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

//! The search loop: `SuggestMove` drives batched `SelectLeaf` /
//! `IncorporateResults` rounds against an external [`Predictor`], then
//! `PickMove` turns the resulting visit counts into a move.

use std::collections::{HashMap, HashSet};

use dg_go::features::Features;
use dg_go::position::SuperkoHistory;
use dg_go::symmetry::Symmetry;
use dg_go::{Color, Point, Position};
use dg_nn::{Inference, Predictor, Request};
use dg_utils::random::Random;

use crate::cache::InferenceCache;
use crate::choose;
use crate::tree::{NodeIndex, Tree};

/// Search configuration. See the module-level table in the design notes for
/// the meaning of each knob; defaults match a reasonable calibration run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Minimum visit count to reach at the current root before picking a
    /// move.
    pub num_readouts: usize,
    /// Batch width; also the upper bound on simultaneous leaf selections.
    pub virtual_losses: usize,
    /// Mix Dirichlet(alpha) noise into the root priors before search.
    pub inject_noise: bool,
    /// Weight of the Dirichlet mix.
    pub noise_mix: f32,
    /// Use visit-count sampling for early moves instead of argmax.
    pub soft_pick: bool,
    /// Exponent applied to visit counts during soft pick.
    pub policy_softmax_temp: f32,
    /// Randomize the dihedral transform used per inference.
    pub random_symmetry: bool,
    /// PUCT exploration constant.
    pub c_puct: f32,
    /// Initial `W` for a newly materialized child = parent `Q` minus this
    /// penalty, clamped to `[-1, 1]`.
    pub value_init_penalty: f32,
    /// `Q` below which the side-to-play concedes (negative).
    pub resign_threshold: f32,
    /// If false, resignation is disabled (used for calibration).
    pub resign_enabled: bool,
    /// Scoring constant added to white's score.
    pub komi: f32,
    /// `0` means pick from system entropy.
    pub random_seed: u64,
    /// After 5 consecutive passes, forbid play in pass-alive regions.
    pub restrict_in_bensons: bool,
    /// Track every root position reached and reject superko repeats.
    pub enforce_superko: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            num_readouts: *dg_utils::config::NUM_ROLLOUT,
            virtual_losses: 8,
            inject_noise: true,
            noise_mix: 0.25,
            soft_pick: true,
            policy_softmax_temp: 1.0,
            random_symmetry: true,
            c_puct: 1.5,
            value_init_penalty: 0.1,
            resign_threshold: -0.95,
            resign_enabled: true,
            komi: 7.5,
            random_seed: 0,
            restrict_in_bensons: false,
            enforce_superko: true,
        }
    }
}

#[derive(Default)]
struct GameHistory {
    seen: HashSet<u64>,
}

impl SuperkoHistory for GameHistory {
    fn has_position_been_played_before(&self, hash: u64) -> bool {
        self.seen.contains(&hash)
    }
}

/// Owns a search tree rooted at the current game position, the
/// reproducible RNG used for noise/soft-pick, and an optional inference
/// cache. Not `Sync`: a `Player` is driven by a single thread, per the
/// single-threaded-cooperative scheduling model.
pub struct Player<'a> {
    tree: Tree,
    predictor: &'a dyn Predictor,
    options: Options,
    rng: Random,
    cache: Option<InferenceCache>,
    superko_history: Option<GameHistory>,
    /// Real, played positions strictly older than the current tree root,
    /// oldest first. Used to extend the 8-ply feature history across a
    /// `PlayMove` boundary.
    played_history: Vec<Position>,
    /// Passes played back to back at the real game root. Reset by any
    /// non-pass move; drives `restrict_in_bensons`.
    consecutive_passes: u32,
}

impl<'a> Player<'a> {
    pub fn new(predictor: &'a dyn Predictor, options: Options, root_position: Position) -> Player<'a> {
        let rng = Random::new(options.random_seed, 0);
        let superko_history = if options.enforce_superko { Some(GameHistory::default()) } else { None };

        Player {
            tree: Tree::new(root_position),
            predictor,
            options,
            rng,
            cache: None,
            superko_history,
            played_history: Vec::new(),
            consecutive_passes: 0,
        }
    }

    pub fn with_cache(mut self, cache: InferenceCache) -> Player<'a> {
        self.cache = Some(cache);
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // -- feature construction --------------------------------------------

    fn player_mix(color: Color) -> u64 {
        color as u8 as u64
    }

    fn chosen_symmetry(&self, position: &Position) -> Symmetry {
        if self.options.random_symmetry {
            Symmetry::from_hash(position.stone_hash(), Self::player_mix(position.to_play()))
        } else {
            Symmetry::Identity
        }
    }

    fn opponent_passed(&self, idx: NodeIndex) -> bool {
        let node = self.tree.node(idx);
        let size = node.position().size();
        node.move_from_parent.is_pass(size)
    }

    /// Builds the 17-plane tensor for `leaf` by chaining `Features::update`
    /// across the real history leading into the current root, then the
    /// speculative path from the root down to `leaf`.
    fn build_features(&self, leaf: NodeIndex) -> Features {
        let mut tree_chain = vec![leaf];
        let mut current = self.tree.node(leaf).parent;
        while let Some(idx) = current {
            tree_chain.push(idx);
            current = self.tree.node(idx).parent;
        }
        tree_chain.reverse();

        let context_len = 7usize.saturating_sub(tree_chain.len().saturating_sub(1));
        let start = self.played_history.len().saturating_sub(context_len);

        let mut positions: Vec<&Position> = self.played_history[start..].iter().collect();
        for &idx in &tree_chain {
            positions.push(self.tree.node(idx).position());
        }

        let mut iter = positions.into_iter();
        let first = iter.next().expect("at least the leaf's own position is always present");
        let mut features = Features::initialize(first);
        for position in iter {
            features = features.update(position);
        }
        features
    }

    fn symmetrize_features(features: &Features, symmetry: Symmetry) -> Vec<dg_utils::types::f16> {
        use dg_utils::types::f16;

        let size = features.size();
        let area = size as usize * size as usize;
        let mut out = vec![f16::from_f32(0.0); features.as_slice().len()];

        for plane in 0..dg_go::features::NUM_FEATURE_PLANES {
            let base = plane * area;
            let input: Vec<f32> =
                features.as_slice()[base..base + area].iter().map(|v| v.to_f32()).collect();
            let transformed = symmetry.apply_plane(&input, size);

            for (i, &v) in transformed.iter().enumerate() {
                out[base + i] = f16::from_f32(v);
            }
        }

        out
    }

    fn terminal_value(&self, leaf: NodeIndex) -> f32 {
        let position = self.tree.node(leaf).position();
        let score = position.calculate_score(self.options.komi);
        let value_for_black = if score > 0.0 {
            1.0
        } else if score < 0.0 {
            -1.0
        } else {
            0.0
        };

        if position.to_play() == Color::Black {
            value_for_black
        } else {
            -value_for_black
        }
    }

    /// Resolves policy/value for every distinct, non-terminal leaf in
    /// `leaves`: a cache hit short-circuits the model, otherwise the leaf is
    /// folded into a single batched `predict` call.
    fn evaluate_leaves(&mut self, leaves: &[NodeIndex]) -> HashMap<NodeIndex, (Vec<f32>, f32)> {
        let mut resolved = HashMap::new();
        let mut to_request = Vec::new();
        let mut requests = Vec::new();

        for &leaf in leaves {
            let position = self.tree.node(leaf).position().clone();
            let symmetry = self.chosen_symmetry(&position);
            let opponent_passed = self.opponent_passed(leaf);

            let hit = self.cache.as_mut().and_then(|cache| {
                cache.get(position.stone_hash(), position.ko(), position.to_play(), opponent_passed)
            });

            if let Some((policy, value)) = hit {
                resolved.insert(leaf, (policy, value));
                continue;
            }

            let features = self.build_features(leaf);
            let tensor = Self::symmetrize_features(&features, symmetry);
            requests.push(Request { features: tensor, symmetry });
            to_request.push((leaf, symmetry, position));
        }

        if !requests.is_empty() {
            let inferences: Vec<Inference> = self.predictor.predict(&requests);

            for ((leaf, symmetry, position), inference) in to_request.into_iter().zip(inferences) {
                let size = position.size();
                let policy = symmetry.inverse().apply_policy(&inference.policy, size);
                let value = inference.value;

                if let Some(cache) = self.cache.as_mut() {
                    let opponent_passed = self.opponent_passed(leaf);
                    cache.insert(
                        position.stone_hash(),
                        position.ko(),
                        position.to_play(),
                        opponent_passed,
                        policy.clone(),
                        value,
                    );
                }

                resolved.insert(leaf, (policy, value));
            }
        }

        resolved
    }

    // -- search loop -------------------------------------------------------

    fn run_one_batch(&mut self, root: NodeIndex) {
        let mut selections = Vec::with_capacity(self.options.virtual_losses);

        for _ in 0..self.options.virtual_losses {
            let leaf = self.tree.select_leaf(self.options.c_puct, self.options.value_init_penalty);

            if self.tree.is_terminal(leaf) {
                let value = self.terminal_value(leaf);
                self.tree.backup_value(leaf, value, root);
                continue;
            }

            self.tree.add_virtual_loss(leaf, root);
            selections.push(leaf);
        }

        if selections.is_empty() {
            return;
        }

        let mut distinct = Vec::new();
        for &leaf in &selections {
            if !distinct.contains(&leaf) {
                distinct.push(leaf);
            }
        }

        let resolved = self.evaluate_leaves(&distinct);

        for leaf in selections {
            self.tree.revert_virtual_loss(leaf, root);
            let (policy, value) = resolved.get(&leaf).expect("every selected leaf was resolved").clone();
            self.tree.incorporate_results(leaf, &policy, value, root);
        }
    }

    /// Performs `num_readouts` worth of search (relative to the current
    /// root's visit count) and returns the chosen move.
    pub fn suggest_move(&mut self, new_readouts: usize) -> Point {
        let root = self.tree.root();

        if !self.tree.node(root).is_expanded() {
            let resolved = self.evaluate_leaves(&[root]);
            let (policy, value) = resolved.get(&root).unwrap().clone();
            self.tree.incorporate_results(root, &policy, value, root);
        }

        if self.options.inject_noise {
            let size = self.tree.node(root).position().size();
            let num_slots = self.tree.node(root).edges().len();
            let alpha = 0.03 * 361.0 / (size as f32 * size as f32);
            let noise = self.rng.dirichlet(alpha, num_slots);
            self.tree.inject_noise(root, &noise, self.options.noise_mix);
        }

        let target = self.tree.node(root).total_visits() as usize + new_readouts;
        while (self.tree.node(root).total_visits() as usize) < target {
            self.run_one_batch(root);
        }

        self.pick_move()
    }

    /// Temperature cutoff: `floor(N^2 / 12)`, per the early-game soft-pick
    /// rule.
    fn soft_pick_cutoff(size: u8) -> u32 {
        (size as u32 * size as u32) / 12
    }

    fn pick_move(&mut self) -> Point {
        let root = self.tree.root();
        let node = self.tree.node(root);
        let size = node.position().size();
        let move_number = node.position().move_number();

        if self.options.soft_pick && move_number < Self::soft_pick_cutoff(size) {
            choose::pick_move_soft(node, self.options.policy_softmax_temp, &mut self.rng)
        } else {
            choose::pick_move_argmax(node, self.options.c_puct)
        }
    }

    /// `Q` from the side-to-play's perspective at the current root.
    fn root_q(&self) -> f32 {
        let root = self.tree.root();
        let node = self.tree.node(root);
        let sign = if node.position().to_play() == Color::Black { 1.0 } else { -1.0 };
        let n_parent = node.total_visits().max(1) as f32;
        let w: f32 = node.edges().iter().map(|e| e.w).sum();

        sign * w / n_parent
    }

    pub fn should_resign(&self) -> bool {
        self.options.resign_enabled && self.root_q() < self.options.resign_threshold
    }

    /// Advances the search root to the child reached by `mv`, pruning
    /// siblings. Fails loudly if `mv` is not legal at the current root
    /// (precondition violation, per the error-handling taxonomy).
    pub fn play_move(&mut self, mv: Point) -> Point {
        let root = self.tree.root();
        let size = self.tree.node(root).position().size();
        assert!(self.tree.node(root).position().is_legal(mv), "illegal move: {:?}", mv);

        let old_position = self.tree.node(root).position().clone();
        self.tree.advance_root(mv, self.options.value_init_penalty);
        self.played_history.push(old_position);

        if mv.is_pass(size) {
            self.consecutive_passes += 1;
        } else {
            self.consecutive_passes = 0;
        }

        if self.superko_history.is_some() {
            let new_hash = self.tree.node(self.tree.root()).position().stone_hash();
            self.superko_history.as_mut().unwrap().seen.insert(new_hash);

            let history = self.superko_history.as_ref().unwrap();
            self.tree.recompute_root_legal_moves(Some(history));
        }

        if self.options.restrict_in_bensons && self.consecutive_passes >= 5 {
            let forbidden = self.tree.node(self.tree.root()).position().calculate_pass_alive_territory();
            self.tree.restrict_root_legal_moves(&forbidden);
        }

        mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_go::zobrist;
    use dg_nn::predictor::RandomPredictor;

    fn setup() {
        zobrist::ensure_initialized();
    }

    #[test]
    fn suggest_move_returns_an_on_board_point_after_search() {
        setup();
        let predictor = RandomPredictor::new(9);
        let options = Options { num_readouts: 16, virtual_losses: 4, inject_noise: false, ..Options::default() };
        let mut player = Player::new(&predictor, options, Position::new(9));

        let mv = player.suggest_move(16);
        assert!(mv.is_on_board(9) || mv.is_pass(9));
    }

    #[test]
    fn play_move_prunes_to_the_chosen_child() {
        setup();
        let predictor = RandomPredictor::new(9);
        let options = Options { num_readouts: 4, virtual_losses: 2, inject_noise: false, ..Options::default() };
        let mut player = Player::new(&predictor, options, Position::new(9));

        let mv = player.suggest_move(4);
        player.play_move(mv);

        assert_eq!(player.tree().root_node().position().move_number(), 1);
    }

    #[test]
    fn restrict_in_bensons_forbids_play_in_pass_alive_territory_after_five_passes() {
        setup();
        let size = 9;
        let mut base_position = Position::new(size);

        // Fill the whole board Black except two far-apart single points:
        // one connected Black chain with two distinct one-point vital
        // eyes, the textbook pass-alive shape.
        let eye_a = Point::from_xy(0, 0, size);
        let eye_b = Point::from_xy(8, 8, size);
        for point in Point::all(size) {
            if point != eye_a && point != eye_b {
                base_position.play_move_as(point, Color::Black);
            }
        }

        let territory = base_position.calculate_pass_alive_territory();
        assert!(territory.contains(&eye_a));
        assert!(territory.contains(&eye_b));

        let predictor = RandomPredictor::new(size);
        let mut restricted = Player::new(
            &predictor,
            Options { restrict_in_bensons: true, enforce_superko: false, ..Options::default() },
            base_position.clone(),
        );
        let mut unrestricted = Player::new(
            &predictor,
            Options { restrict_in_bensons: false, enforce_superko: false, ..Options::default() },
            base_position,
        );

        for _ in 0..5 {
            restricted.play_move(Point::pass(size));
            unrestricted.play_move(Point::pass(size));
        }

        // Without the option, refilling one's own eye is an ordinary legal
        // move (the chain keeps its other eye as a liberty).
        assert!(unrestricted.tree().root_node().position().is_legal(eye_a));
        assert!(unrestricted.tree().root_node().position().is_legal(eye_b));

        // With the option, five consecutive passes forbid play in either
        // eye, though pass itself stays legal.
        assert!(!restricted.tree().root_node().position().is_legal(eye_a));
        assert!(!restricted.tree().root_node().position().is_legal(eye_b));
        assert!(restricted.tree().root_node().position().is_legal(Point::pass(size)));
    }

    #[test]
    fn should_resign_is_false_when_disabled() {
        setup();
        let predictor = RandomPredictor::new(9);
        let options = Options { resign_enabled: false, ..Options::default() };
        let player = Player::new(&predictor, options, Position::new(9));

        assert!(!player.should_resign());
    }
}
