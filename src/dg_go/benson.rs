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

//! Benson's algorithm for pass-alive chains: iteratively discard chains
//! that lack two distinct enclosed, fully-surrounded ("small") eye regions
//! among the chains still under consideration, until a fixed point.

use crate::color::Color;
use crate::group::GroupId;
use crate::point::Point;
use crate::position::Position;
use std::collections::{HashMap, HashSet};

struct Region {
    members: Vec<Point>,
    border_chains: HashSet<GroupId>,
    borders_opponent: bool,
}

/// Maximal empty regions, annotated with which `color` chains border them
/// and whether they also touch the opposite color (which disqualifies them
/// from ever being enclosed by `color`).
fn build_regions(position: &Position, color: Color) -> Vec<Region> {
    let size = position.size();
    let area = position.area();
    let mut visited = vec![false; area];
    let mut regions = Vec::new();

    for point in Point::all(size) {
        if !position.stone_at(point).is_empty() || visited[point.index()] {
            continue;
        }

        let mut stack = vec![point];
        visited[point.index()] = true;
        let mut members = Vec::new();
        let mut border_chains = HashSet::new();
        let mut borders_opponent = false;

        while let Some(p) = stack.pop() {
            members.push(p);
            for neighbor in p.neighbors(size) {
                let neighbor_color = position.stone_at(neighbor);
                if neighbor_color.is_empty() {
                    if !visited[neighbor.index()] {
                        visited[neighbor.index()] = true;
                        stack.push(neighbor);
                    }
                } else if neighbor_color == color {
                    if let Some(gid) = position.group_id_at(neighbor) {
                        border_chains.insert(gid);
                    }
                } else {
                    borders_opponent = true;
                }
            }
        }

        regions.push(Region { members, border_chains, borders_opponent });
    }

    regions
}

fn is_small(region: &Region, position: &Position, color: Color, candidates: &HashSet<GroupId>) -> bool {
    let size = position.size();

    region.members.iter().all(|&p| {
        p.neighbors(size).any(|neighbor| {
            position.stone_at(neighbor) == color
                && position.group_id_at(neighbor).map_or(false, |g| candidates.contains(&g))
        })
    })
}

/// The set of group ids belonging to `color` that are pass-alive.
pub fn pass_alive_chains(position: &Position, color: Color) -> HashSet<GroupId> {
    let size = position.size();
    let mut candidates: HashSet<GroupId> = HashSet::new();

    for point in Point::all(size) {
        if position.stone_at(point) == color {
            if let Some(group_id) = position.group_id_at(point) {
                candidates.insert(group_id);
            }
        }
    }

    let regions = build_regions(position, color);

    loop {
        let mut vital: HashMap<GroupId, HashSet<usize>> = HashMap::new();

        for (index, region) in regions.iter().enumerate() {
            if region.borders_opponent {
                continue;
            }
            if region.border_chains.is_empty() || !region.border_chains.iter().all(|c| candidates.contains(c)) {
                continue;
            }
            if is_small(region, position, color, &candidates) {
                for &chain in &region.border_chains {
                    vital.entry(chain).or_default().insert(index);
                }
            }
        }

        let before = candidates.len();
        candidates.retain(|chain| vital.get(chain).map_or(false, |regions| regions.len() >= 2));

        if candidates.len() == before {
            break;
        }
    }

    candidates
}

/// All points belonging to a pass-alive chain, split by color.
pub fn pass_alive_points(position: &Position) -> (HashSet<Point>, HashSet<Point>) {
    let size = position.size();
    let black_chains = pass_alive_chains(position, Color::Black);
    let white_chains = pass_alive_chains(position, Color::White);

    let mut black_points = HashSet::new();
    let mut white_points = HashSet::new();

    for point in Point::all(size) {
        match position.stone_at(point) {
            Color::Black => {
                if position.group_id_at(point).map_or(false, |g| black_chains.contains(&g)) {
                    black_points.insert(point);
                }
            }
            Color::White => {
                if position.group_id_at(point).map_or(false, |g| white_chains.contains(&g)) {
                    white_points.insert(point);
                }
            }
            Color::Empty => {}
        }
    }

    (black_points, white_points)
}

/// The empty points lying in a region vital to a surviving pass-alive chain
/// of either color -- the "pass-alive regions" spoken of by
/// `restrict_in_bensons`.
fn alive_empty_points(position: &Position) -> HashSet<Point> {
    let black_chains = pass_alive_chains(position, Color::Black);
    let white_chains = pass_alive_chains(position, Color::White);

    let black_regions = build_regions(position, Color::Black);
    let white_regions = build_regions(position, Color::White);

    let mut alive_empty_points: HashSet<Point> = HashSet::new();

    for (chains, regions, color) in [
        (&black_chains, &black_regions, Color::Black),
        (&white_chains, &white_regions, Color::White),
    ] {
        for region in regions {
            if region.borders_opponent {
                continue;
            }
            if region.border_chains.is_empty() || !region.border_chains.iter().all(|c| chains.contains(c)) {
                continue;
            }
            if is_small(region, position, color, chains) {
                alive_empty_points.extend(region.members.iter().copied());
            }
        }
    }

    alive_empty_points
}

/// True when every empty point on the board lies in a region vital to a
/// surviving pass-alive chain of either color.
pub fn whole_board_pass_alive(position: &Position) -> bool {
    let size = position.size();
    let alive_empty_points = alive_empty_points(position);

    Point::all(size)
        .filter(|&p| position.stone_at(p).is_empty())
        .all(|p| alive_empty_points.contains(&p))
}

/// The set of empty points a caller enforcing `restrict_in_bensons` should
/// forbid play in: territory vital to a pass-alive chain of either color.
pub fn pass_alive_territory(position: &Position) -> HashSet<Point> {
    alive_empty_points(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zobrist;

    #[test]
    fn empty_board_has_no_pass_alive_chains() {
        zobrist::ensure_initialized();
        let position = Position::new(9);
        assert!(pass_alive_chains(&position, Color::Black).is_empty());
        assert!(!position.calculate_whole_board_pass_alive());
    }
}
