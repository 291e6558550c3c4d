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

//! `PickMove`'s two strategies: deterministic argmax-over-visit-count (with
//! a child-action-score tie-break) and early-game proportional sampling.

use dg_go::{Color, Point};
use dg_utils::random::Random;
use ordered_float::OrderedFloat;

use crate::node::Node;

/// The index of the largest value, breaking ties toward the smallest index.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;

    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best_value = v;
            best = i;
        }
    }

    best
}

fn action_score(node: &Node, point: Point, c_puct: f32) -> f32 {
    let sign = if node.position().to_play() == Color::Black { 1.0 } else { -1.0 };
    let n_parent: u32 = node.edges().iter().map(|e| e.n).sum();
    let sqrt_term = (n_parent.saturating_sub(1).max(1) as f32).sqrt();

    let edge = node.edge(point);
    let u = c_puct * edge.p * sqrt_term / (1.0 + edge.n as f32);

    edge.q() * sign + u
}

/// Argmax over visit counts across every move slot (board points and pass);
/// ties are broken by the higher child action score, then by smallest
/// index.
pub fn pick_move_argmax(node: &Node, c_puct: f32) -> Point {
    let size = node.position().size();
    let edges = node.edges();

    let mut best_point = Point::pass(size);
    let mut best_n = 0u32;
    let mut best_score = OrderedFloat(f32::NEG_INFINITY);

    for (i, edge) in edges.iter().enumerate() {
        let point = Point::from_index(i as u16);
        let score = OrderedFloat(action_score(node, point, c_puct));

        if edge.n > best_n || (edge.n == best_n && score > best_score) {
            best_n = edge.n;
            best_score = score;
            best_point = point;
        }
    }

    best_point
}

/// Samples a board point (never pass) proportional to `N(c)^(1 /
/// policy_softmax_temp)`.
pub fn pick_move_soft(node: &Node, policy_softmax_temp: f32, rng: &mut Random) -> Point {
    let size = node.position().size();
    let area = size as usize * size as usize;
    let edges = node.edges();

    let weights: Vec<f32> =
        edges[..area].iter().map(|e| (e.n as f32).powf(1.0 / policy_softmax_temp)).collect();
    let total: f32 = weights.iter().sum();

    if total <= 0.0 {
        return Point::pass(size);
    }

    let threshold = rng.uniform() * total;
    let mut running = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        running += w;
        if running >= threshold {
            return Point::from_index(i as u16);
        }
    }

    Point::from_index((area - 1) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_go::{zobrist, Position};

    fn setup() {
        zobrist::ensure_initialized();
    }

    #[test]
    fn argmax_breaks_ties_toward_smallest_index() {
        let values = [1.0, 3.0, 3.0, 2.0];
        assert_eq!(argmax(&values), 1);
    }

    #[test]
    fn pick_move_argmax_prefers_highest_visit_count() {
        setup();
        let mut node = Node::new(None, Point::invalid(), Position::new(9));
        node.edges[10].n = 25;
        node.edges[3].n = 10;
        node.edges[7].n = 3;

        assert_eq!(pick_move_argmax(&node, 1.5), Point::from_index(10));
    }

    #[test]
    fn pick_move_soft_never_returns_pass() {
        setup();
        let mut node = Node::new(None, Point::invalid(), Position::new(9));
        node.edges[0].n = 5;
        node.edges[1].n = 5;

        let mut rng = Random::new(42, 1);
        for _ in 0..50 {
            let mv = pick_move_soft(&node, 1.0, &mut rng);
            assert!(mv.is_on_board(9));
        }
    }
}
