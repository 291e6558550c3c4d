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

//! The node arena: 32-bit indices instead of owned child pointers, so the
//! whole tree resets in one `Vec::clear` between games and individual node
//! lookups stay cache-friendly.

use std::collections::HashSet;

use dg_go::position::SuperkoHistory;
use dg_go::{Color, Point, Position};
use ordered_float::OrderedFloat;

use crate::node::Node;

/// An index into `Tree::nodes`. Stable for the lifetime of the arena; never
/// reused after `PruneChildren`-style advancement (the orphaned subtree is
/// simply left unreachable until the next `Tree::new`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

pub struct Tree {
    nodes: Vec<Node>,
    root: NodeIndex,
}

/// All `area + 1` move slots in ascending `Point::index()` order (on-board
/// points, then pass), the order `SelectLeaf`'s tie-break relies on.
fn all_move_points(size: u8) -> impl Iterator<Item = Point> {
    Point::all(size).chain(std::iter::once(Point::pass(size)))
}

/// A node's own aggregate value estimate: total `W` over total `N` across
/// all its children, from this node's to-play perspective.
fn aggregate_q(node: &Node) -> f32 {
    let n: u32 = node.edges.iter().map(|e| e.n).sum();
    if n == 0 {
        return 0.0;
    }
    let w: f32 = node.edges.iter().map(|e| e.w).sum();
    w / n as f32
}

impl Tree {
    pub fn new(root_position: Position) -> Tree {
        let root_node = Node::new(None, Point::invalid(), root_position);

        Tree { nodes: vec![root_node], root: NodeIndex(0) }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.as_usize()]
    }

    pub fn root_node(&self) -> &Node {
        self.node(self.root)
    }

    /// True if the position at `idx` was reached by two consecutive passes,
    /// i.e. the game has ended and no inference should be requested for it.
    pub fn is_terminal(&self, idx: NodeIndex) -> bool {
        let node = &self.nodes[idx.as_usize()];
        let size = node.position.size();

        if !node.move_from_parent.is_pass(size) {
            return false;
        }

        match node.parent {
            Some(parent) => {
                let parent = &self.nodes[parent.as_usize()];
                parent.move_from_parent.is_pass(size)
            }
            None => false,
        }
    }

    // -- selection ------------------------------------------------------

    /// `score(c) = Q(c) * sign + U(c) - 1000 * illegal(c)`, breaking ties by
    /// smallest child index (guaranteed by scanning in ascending order and
    /// only replacing the incumbent on a strictly greater score).
    fn best_child_move(&self, idx: NodeIndex, c_puct: f32) -> Point {
        let node = &self.nodes[idx.as_usize()];
        let position = &node.position;
        let size = position.size();
        let sign = if position.to_play() == Color::Black { 1.0 } else { -1.0 };

        let n_parent: u32 = node.edges.iter().map(|e| e.n).sum();
        let sqrt_term = (n_parent.saturating_sub(1).max(1) as f32).sqrt();

        let mut best_score = OrderedFloat(f32::NEG_INFINITY);
        let mut best_point = Point::pass(size);

        for point in all_move_points(size) {
            let edge = &node.edges[point.index()];
            let u = c_puct * edge.p * sqrt_term / (1.0 + edge.n as f32);
            let illegal_penalty = if position.is_legal(point) { 0.0 } else { 1000.0 };
            let score = OrderedFloat(edge.q() * sign + u - illegal_penalty);

            if score > best_score {
                best_score = score;
                best_point = point;
            }
        }

        best_point
    }

    /// Descends from the root, materializing the first not-yet-created child
    /// it encounters, and returns that leaf. Returns a node in place if it is
    /// not yet expanded (including the root, on the first call).
    ///
    /// A freshly materialized child's incoming edge is seeded with
    /// `W := clamp(parent_Q - value_init_penalty, -1, 1)` rather than zero,
    /// so an unvisited move starts at a pessimistic estimate of the parent's
    /// current value instead of an optimistic literal zero.
    pub fn select_leaf(&mut self, c_puct: f32, value_init_penalty: f32) -> NodeIndex {
        let mut current = self.root;

        loop {
            if !self.nodes[current.as_usize()].is_expanded {
                return current;
            }

            let mv = self.best_child_move(current, c_puct);
            let existing = self.nodes[current.as_usize()].children.get(&mv).copied();

            match existing {
                Some(child) => current = child,
                None => return self.materialize_child(current, mv, value_init_penalty),
            }
        }
    }

    fn materialize_child(&mut self, parent: NodeIndex, mv: Point, value_init_penalty: f32) -> NodeIndex {
        let mut position = self.nodes[parent.as_usize()].position.clone();
        position.play_move(mv);

        let child = Node::new(Some(parent), mv, position);
        let child_idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(child);

        let parent_node = &mut self.nodes[parent.as_usize()];
        let parent_q = aggregate_q(parent_node);
        parent_node.edges[mv.index()].w = (parent_q - value_init_penalty).clamp(-1.0, 1.0);
        parent_node.children.insert(mv, child_idx);

        child_idx
    }

    pub fn set_canonical_symmetry(&mut self, idx: NodeIndex, symmetry: dg_go::symmetry::Symmetry) {
        self.nodes[idx.as_usize()].set_canonical_symmetry(symmetry);
    }

    /// Re-derives the root's `legal_moves` bitmap with a positional-superko
    /// oracle consulted. Only the root is refreshed: superko is a property
    /// of the real game history, and is checked only for the move actually
    /// about to be played, not for hypothetical positions deeper in the
    /// search tree.
    pub fn recompute_root_legal_moves(&mut self, superko: Option<&dyn SuperkoHistory>) {
        self.nodes[self.root.as_usize()].position.recompute_legal_moves(superko);
    }

    /// Clears legality for `forbidden` points at the root only, layered on
    /// top of whatever `recompute_root_legal_moves` last produced. Used to
    /// enforce `restrict_in_bensons` once the caller's consecutive-pass
    /// count crosses its threshold.
    pub fn restrict_root_legal_moves(&mut self, forbidden: &HashSet<Point>) {
        self.nodes[self.root.as_usize()].position_mut().restrict_legal_moves(forbidden);
    }

    // -- expansion & backup -----------------------------------------------

    /// Marks `leaf` expanded with `policy` (zeroed on illegal moves and
    /// renormalized, falling back to uniform-over-legal if the remaining
    /// mass is zero), then backs up `value` to `up_to`.
    pub fn incorporate_results(
        &mut self,
        leaf: NodeIndex,
        policy: &[f32],
        value: f32,
        up_to: NodeIndex,
    ) {
        {
            let node = &mut self.nodes[leaf.as_usize()];
            let size = node.position.size();
            let num_slots = node.edges.len();
            let mut masked = vec![0.0f32; num_slots];
            let mut sum = 0.0f32;

            for point in all_move_points(size) {
                if node.position.is_legal(point) {
                    let i = point.index();
                    let p = policy[i].max(0.0);
                    masked[i] = p;
                    sum += p;
                }
            }

            if sum > 0.0 {
                for v in masked.iter_mut() {
                    *v /= sum;
                }
            } else {
                let legal_count =
                    all_move_points(size).filter(|&p| node.position.is_legal(p)).count().max(1);
                let uniform = 1.0 / legal_count as f32;

                for point in all_move_points(size) {
                    if node.position.is_legal(point) {
                        masked[point.index()] = uniform;
                    }
                }
            }

            for (i, edge) in node.edges.iter_mut().enumerate() {
                edge.p = masked[i];
                edge.original_p = masked[i];
            }
            node.is_expanded = true;
        }

        self.backup_value(leaf, value, up_to);
    }

    /// Walks parent-wards from `leaf`, incrementing `N` and accumulating `W`
    /// (value flips sign at every edge), stopping once `up_to`'s own
    /// incoming edge has been updated.
    pub fn backup_value(&mut self, leaf: NodeIndex, value: f32, up_to: NodeIndex) {
        let mut current = leaf;
        let mut v = value;

        while current != up_to {
            let (parent_idx, mv) = {
                let node = &self.nodes[current.as_usize()];
                (node.parent.expect("backup_value reached the arena root before up_to"), node.move_from_parent)
            };

            let parent = &mut self.nodes[parent_idx.as_usize()];
            let edge = &mut parent.edges[mv.index()];
            edge.n += 1;
            edge.w += v;

            v = -v;
            current = parent_idx;
        }
    }

    fn apply_virtual_loss(&mut self, leaf: NodeIndex, up_to: NodeIndex, delta: i32) {
        let mut current = leaf;
        let mut s = delta as f32;

        while current != up_to {
            let (parent_idx, mv) = {
                let node = &self.nodes[current.as_usize()];
                (node.parent.expect("virtual loss reached the arena root before up_to"), node.move_from_parent)
            };

            let parent = &mut self.nodes[parent_idx.as_usize()];
            let edge = &mut parent.edges[mv.index()];
            edge.n = (edge.n as i64 + delta as i64).max(0) as u32;
            edge.w -= s;

            s = -s;
            current = parent_idx;
        }

        let leaf_node = &mut self.nodes[leaf.as_usize()];
        leaf_node.num_virtual_losses_applied += delta;
    }

    pub fn add_virtual_loss(&mut self, leaf: NodeIndex, up_to: NodeIndex) {
        self.apply_virtual_loss(leaf, up_to, 1);
    }

    pub fn revert_virtual_loss(&mut self, leaf: NodeIndex, up_to: NodeIndex) {
        self.apply_virtual_loss(leaf, up_to, -1);
    }

    /// `P(c) := (1 - mix) * P(c) + mix * noise(c)`, only for legal children.
    pub fn inject_noise(&mut self, idx: NodeIndex, noise: &[f32], mix: f32) {
        let node = &mut self.nodes[idx.as_usize()];
        let size = node.position.size();

        for point in all_move_points(size) {
            if node.position.is_legal(point) {
                let i = point.index();
                let edge = &mut node.edges[i];
                edge.p = (1.0 - mix) * edge.p + mix * noise[i];
            }
        }
    }

    /// Advances the root to the child reached by `mv` (materializing it if
    /// necessary). The previous root and any sibling subtrees become
    /// unreachable garbage in the arena; they are reclaimed in bulk the next
    /// time a fresh `Tree` is built for a new game.
    pub fn advance_root(&mut self, mv: Point, value_init_penalty: f32) -> NodeIndex {
        let existing = self.nodes[self.root.as_usize()].children.get(&mv).copied();
        let child = existing.unwrap_or_else(|| self.materialize_child(self.root, mv, value_init_penalty));

        self.nodes[child.as_usize()].parent = None;
        self.root = child;
        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_go::zobrist;

    fn setup() {
        zobrist::ensure_initialized();
    }

    #[test]
    fn select_leaf_returns_root_when_unexpanded() {
        setup();
        let mut tree = Tree::new(Position::new(9));

        let leaf = tree.select_leaf(1.5, 0.0);
        assert_eq!(leaf, tree.root());
    }

    #[test]
    fn incorporate_results_expands_and_backs_up() {
        setup();
        let mut tree = Tree::new(Position::new(9));
        let root = tree.root();
        let num_slots = tree.node(root).edges().len();

        let policy = vec![1.0 / num_slots as f32; num_slots];
        tree.incorporate_results(root, &policy, 0.5, root);

        assert!(tree.node(root).is_expanded());
    }

    #[test]
    fn virtual_loss_is_fully_reverted() {
        setup();
        let mut tree = Tree::new(Position::new(9));
        let root = tree.root();
        let num_slots = tree.node(root).edges().len();
        let policy = vec![1.0 / num_slots as f32; num_slots];
        tree.incorporate_results(root, &policy, 0.0, root);

        let mut leaves = Vec::new();
        for _ in 0..8 {
            let leaf = tree.select_leaf(1.5, 0.0);
            tree.add_virtual_loss(leaf, root);
            leaves.push(leaf);
        }

        let n_parent: u32 = tree.node(root).edges().iter().map(|e| e.n).sum();
        assert_eq!(n_parent, 8);

        for leaf in leaves {
            tree.revert_virtual_loss(leaf, root);
        }

        let n_parent: u32 = tree.node(root).edges().iter().map(|e| e.n).sum();
        assert_eq!(n_parent, 0);
        for node in &tree.nodes {
            assert_eq!(node.num_virtual_losses_applied(), 0);
        }
    }

    #[test]
    fn backup_value_flips_sign_per_ply() {
        setup();
        let mut tree = Tree::new(Position::new(9));
        let root = tree.root();
        let num_slots = tree.node(root).edges().len();
        let policy = vec![1.0 / num_slots as f32; num_slots];
        tree.incorporate_results(root, &policy, 0.0, root);

        let leaf = tree.select_leaf(1.5, 0.0);
        tree.incorporate_results(leaf, &policy, 1.0, root);

        let mv = tree.node(leaf).move_from_parent;
        let edge = tree.node(root).edge(mv);
        assert_eq!(edge.n, 1);
        assert!((edge.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn puct_prefers_the_less_visited_child_at_equal_q_and_p() {
        setup();
        let mut tree = Tree::new(Position::new(9));
        let root = tree.root();
        let num_slots = tree.node(root).edges().len();
        let policy = vec![1.0 / num_slots as f32; num_slots];
        tree.incorporate_results(root, &policy, 0.0, root);

        let size = tree.root_node().position().size();
        let a = Point::from_xy(0, 0, size);
        let b = Point::from_xy(1, 0, size);

        // Equal P, equal Q (both zero); give `a` visits so only the U term
        // differs. The U term must favor the less-visited `b`.
        {
            let root_node = &mut tree.nodes[tree.root().as_usize()];
            root_node.edges[a.index()].n = 9;
        }

        assert_eq!(tree.best_child_move(root, 1.5), b);
    }

    #[test]
    fn advance_root_prunes_siblings_but_keeps_child_reachable() {
        setup();
        let mut tree = Tree::new(Position::new(9));
        let size = tree.root_node().position().size();
        let mv = Point::from_xy(0, 0, size);

        let new_root = tree.advance_root(mv, 0.0);
        assert_eq!(tree.root(), new_root);
        assert!(tree.node(new_root).position.stone_at(mv) != Color::Empty);
    }
}
