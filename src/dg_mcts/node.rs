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

use dg_go::symmetry::Symmetry;
use dg_go::Position;
use std::collections::HashMap;

use crate::tree::NodeIndex;

/// Per-child statistics, indexed by the child's `Point::index()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeStats {
    /// Visit count, including virtual losses.
    pub n: u32,
    /// Summed value from the parent's side-to-play perspective.
    pub w: f32,
    /// Policy prior, possibly mixed with Dirichlet noise.
    pub p: f32,
    /// The un-noised policy prior.
    pub original_p: f32,
}

impl EdgeStats {
    pub fn q(&self) -> f32 {
        self.w / (1.0 + self.n as f32)
    }
}

/// One node in the search arena. Owns the `Position` it was reached by, an
/// edge-stats slot per legal child index (including pass), and a map from
/// played child move to the already-materialized child node.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) move_from_parent: dg_go::Point,
    pub(crate) position: Position,
    pub(crate) edges: Vec<EdgeStats>,
    pub(crate) children: HashMap<dg_go::Point, NodeIndex>,
    pub(crate) is_expanded: bool,
    pub(crate) num_virtual_losses_applied: i32,
    pub(crate) canonical_symmetry: Symmetry,
}

impl Node {
    pub(crate) fn new(
        parent: Option<NodeIndex>,
        move_from_parent: dg_go::Point,
        position: Position,
    ) -> Node {
        let num_slots = position.area() + 1;

        Node {
            parent,
            move_from_parent,
            position,
            edges: vec![EdgeStats::default(); num_slots],
            children: HashMap::new(),
            is_expanded: false,
            num_virtual_losses_applied: 0,
            canonical_symmetry: Symmetry::Identity,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    pub fn edges(&self) -> &[EdgeStats] {
        &self.edges
    }

    pub fn edge(&self, point: dg_go::Point) -> &EdgeStats {
        &self.edges[point.index()]
    }

    pub fn total_visits(&self) -> u32 {
        self.edges.iter().map(|e| e.n).sum()
    }

    pub fn num_virtual_losses_applied(&self) -> i32 {
        self.num_virtual_losses_applied
    }

    pub fn canonical_symmetry(&self) -> Symmetry {
        self.canonical_symmetry
    }

    pub(crate) fn set_canonical_symmetry(&mut self, symmetry: Symmetry) {
        self.canonical_symmetry = symmetry;
    }
}
