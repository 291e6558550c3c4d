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

//! Budgets for how long a single move's search runs. `num_readouts` is the
//! primary knob; wall-clock strategies are provided for a secondary,
//! externally-facing time control and are otherwise equivalent.

use std::time::{Duration, Instant};

use crate::node::Node;

pub enum TimeStrategyResult {
    NotExpired(usize),
    NotExtended,
    Expired,
    Extended,
}

pub trait TimeStrategy {
    /// Checks whether this time period has expired.
    fn try_extend(&self, root: &Node) -> TimeStrategyResult;
}

/// Returns the minimum number of additional playouts necessary for the
/// second most-visited child to overtake the most-visited child.
fn min_promote_rollouts(root: &Node) -> usize {
    let edges = root.edges();
    let mut top_1 = 0usize;
    let mut top_2 = 0usize;

    for (i, edge) in edges.iter().enumerate() {
        if edge.n > edges[top_1].n {
            top_2 = top_1;
            top_1 = i;
        } else if i != top_1 && edge.n > edges[top_2].n {
            top_2 = i;
        }
    }

    let count_1 = edges[top_1].n;
    let count_2 = edges[top_2].n;

    if count_1 > count_2 {
        (count_1 - count_2) as usize
    } else {
        0
    }
}

/// Implements the `UNST-N` / `EARLY-C` time-management scheme: extend the
/// search until the most-visited child also has the best value, but stop
/// early once the runner-up can no longer catch up within the remaining
/// budget.
pub fn is_done(root: &Node, strategy: &dyn TimeStrategy) -> bool {
    if root.total_visits() == 0 {
        return false;
    }

    match strategy.try_extend(root) {
        TimeStrategyResult::NotExpired(remaining) => min_promote_rollouts(root) > remaining,
        TimeStrategyResult::Extended => false,
        _ => true,
    }
}

/// The default strategy: search until `root` has accumulated `target`
/// visits.
pub struct ReadoutLimit {
    target: usize,
}

impl ReadoutLimit {
    pub fn new(target: usize) -> ReadoutLimit {
        ReadoutLimit { target }
    }
}

impl TimeStrategy for ReadoutLimit {
    fn try_extend(&self, root: &Node) -> TimeStrategyResult {
        let n = root.total_visits() as usize;

        if n >= self.target {
            TimeStrategyResult::Expired
        } else {
            TimeStrategyResult::NotExpired(self.target - n)
        }
    }
}

/// A wall-clock budget for a single move: `seconds_per_move` as a baseline,
/// with up to `time_limit` of banked time it may borrow from, decaying the
/// amount it is willing to borrow by `decay_factor` on every extension.
pub struct WallClockLimit {
    started: Instant,
    per_move: Duration,
    remaining_bank: std::cell::Cell<Duration>,
    decay_factor: f32,
}

impl WallClockLimit {
    pub fn new(per_move: Duration, time_limit: Duration, decay_factor: f32) -> WallClockLimit {
        WallClockLimit {
            started: Instant::now(),
            per_move,
            remaining_bank: std::cell::Cell::new(time_limit),
            decay_factor,
        }
    }
}

impl TimeStrategy for WallClockLimit {
    fn try_extend(&self, _root: &Node) -> TimeStrategyResult {
        let elapsed = self.started.elapsed();

        if elapsed < self.per_move {
            return TimeStrategyResult::NotExpired(1);
        }

        let bank = self.remaining_bank.get();
        if bank.is_zero() {
            return TimeStrategyResult::Expired;
        }

        let borrow = bank.mul_f32(1.0 - self.decay_factor.clamp(0.0, 1.0));
        if borrow.is_zero() {
            return TimeStrategyResult::Expired;
        }

        self.remaining_bank.set(bank - borrow);
        TimeStrategyResult::Extended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_go::{zobrist, Position};

    fn setup() {
        zobrist::ensure_initialized();
    }

    #[test]
    fn is_done_is_false_before_any_visit() {
        setup();
        let node = Node::new(None, dg_go::Point::invalid(), Position::new(9));
        let strategy = ReadoutLimit::new(100);

        assert!(!is_done(&node, &strategy));
    }

    #[test]
    fn readout_limit_expires_at_target() {
        setup();
        let mut node = Node::new(None, dg_go::Point::invalid(), Position::new(9));
        node.edges[0].n = 100;
        let strategy = ReadoutLimit::new(100);

        assert!(is_done(&node, &strategy));
    }
}
