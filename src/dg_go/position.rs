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

//! The mutable board representation: stones packed with their group id,
//! a pool of group records, the running Zobrist hash, and legal-move
//! bookkeeping.

use crate::benson;
use crate::color::Color;
use crate::group::{Group, GroupId, GroupPool};
use crate::point::Point;
use crate::score;
use crate::zobrist;
use std::collections::HashSet;

/// A stone packs its color into the low two bits and, when occupied, its
/// group id into the remaining bits.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Stone(u16);

const COLOR_BITS: u16 = 2;
const COLOR_MASK: u16 = 0b11;

impl Stone {
    pub const EMPTY: Stone = Stone(0);

    fn new(color: Color, group: GroupId) -> Stone {
        Stone(((group.raw()) << COLOR_BITS) | color as u16)
    }

    pub fn color(self) -> Color {
        Color::from((self.0 & COLOR_MASK) as u8)
    }

    pub fn group_id(self) -> Option<GroupId> {
        if self.color().is_empty() {
            None
        } else {
            Some(GroupId::from(self.0 >> COLOR_BITS))
        }
    }
}

/// Result of classifying a candidate move without regard to positional
/// superko (the legal-move bitmap folds that consideration in separately).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MoveClass {
    Illegal,
    NoCapture,
    Capture,
}

/// An external collaborator that remembers every `stone_hash` seen so far
/// in the current game, so `Position` can enforce positional superko.
pub trait SuperkoHistory {
    fn has_position_been_played_before(&self, hash: u64) -> bool;
}

#[derive(Debug, Clone)]
struct ScalarSnapshot {
    ko: Point,
    to_play: Color,
    n: u32,
    stone_hash: u64,
    num_captures: [u32; 2],
    legal_moves: Vec<bool>,
}

/// The inverse of a single `play_move` call, opaque to callers other than
/// `Position::undo_move`.
#[derive(Debug, Clone)]
pub struct UndoMove {
    point: Point,
    prev: ScalarSnapshot,
    changed_stones: Vec<(Point, Stone)>,
    changed_groups: Vec<(GroupId, Option<Group>)>,
}

#[derive(Debug, Clone)]
pub struct Position {
    size: u8,
    stones: Vec<Stone>,
    groups: GroupPool,
    to_play: Color,
    n: u32,
    ko: Point,
    /// Indexed `0..=area`; the last slot is the pass pseudo-move.
    legal_moves: Vec<bool>,
    num_captures: [u32; 2],
    stone_hash: u64,
}

impl Position {
    pub fn new(size: u8) -> Position {
        let area = size as usize * size as usize;
        let mut position = Position {
            size,
            stones: vec![Stone::EMPTY; area],
            groups: GroupPool::new(),
            to_play: Color::Black,
            n: 0,
            ko: Point::invalid(),
            legal_moves: vec![true; area + 1],
            num_captures: [0, 0],
            stone_hash: 0,
        };
        position.recompute_legal_moves(None);
        position
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn area(&self) -> usize {
        self.size as usize * self.size as usize
    }

    pub fn to_play(&self) -> Color {
        self.to_play
    }

    pub fn move_number(&self) -> u32 {
        self.n
    }

    pub fn ko(&self) -> Point {
        self.ko
    }

    pub fn stone_hash(&self) -> u64 {
        self.stone_hash
    }

    pub fn num_captures(&self, color: Color) -> u32 {
        self.num_captures[color_index(color)]
    }

    pub fn stone_at(&self, point: Point) -> Color {
        self.stones[point.index()].color()
    }

    pub fn is_legal(&self, point: Point) -> bool {
        self.legal_moves[point.index()]
    }

    pub fn legal_moves(&self) -> &[bool] {
        &self.legal_moves
    }

    /// The group a stone belongs to, if any.
    pub fn group_at(&self, point: Point) -> Option<&Group> {
        self.stones[point.index()]
            .group_id()
            .map(|gid| self.groups.get(gid))
    }

    pub fn group_id_at(&self, point: Point) -> Option<GroupId> {
        self.stones[point.index()].group_id()
    }

    // -- move classification -------------------------------------------------

    /// Finds opponent groups that would be captured by placing `color` at
    /// `point`, each paired with an on-board stone belonging to that group
    /// (used to seed a flood fill).
    fn groups_captured_by(&self, point: Point, color: Color) -> Vec<(GroupId, Point)> {
        let opponent = color.opposite();
        let mut found: Vec<(GroupId, Point)> = Vec::new();

        for neighbor in point.neighbors(self.size) {
            let stone = self.stones[neighbor.index()];
            if stone.color() == opponent {
                if let Some(gid) = stone.group_id() {
                    if self.groups.get(gid).num_liberties == 1 && !found.iter().any(|&(g, _)| g == gid) {
                        found.push((gid, neighbor));
                    }
                }
            }
        }

        found
    }

    fn groups_friendly_to(&self, point: Point, color: Color) -> Vec<(GroupId, Point)> {
        let mut found: Vec<(GroupId, Point)> = Vec::new();

        for neighbor in point.neighbors(self.size) {
            let stone = self.stones[neighbor.index()];
            if stone.color() == color {
                if let Some(gid) = stone.group_id() {
                    if !found.iter().any(|&(g, _)| g == gid) {
                        found.push((gid, neighbor));
                    }
                }
            }
        }

        found
    }

    /// Classifies `point` as a move by `to_play`, ignoring superko.
    pub fn classify_move_ignoring_superko(&self, point: Point) -> MoveClass {
        self.classify_move_ignoring_superko_as(point, self.to_play)
    }

    pub fn classify_move_ignoring_superko_as(&self, point: Point, color: Color) -> MoveClass {
        if point.is_pass(self.size) {
            return MoveClass::NoCapture;
        }
        if !point.is_on_board(self.size) {
            return MoveClass::Illegal;
        }
        if !self.stones[point.index()].color().is_empty() {
            return MoveClass::Illegal;
        }
        if point == self.ko {
            return MoveClass::Illegal;
        }

        let opponent = color.opposite();
        let mut no_empty_neighbor = true;
        let mut every_same_color_group_has_one_liberty = true;
        let mut no_opponent_group_has_one_liberty = true;

        for neighbor in point.neighbors(self.size) {
            let stone = self.stones[neighbor.index()];
            match stone.color() {
                Color::Empty => no_empty_neighbor = false,
                c if c == color => {
                    let liberties = self.groups.get(stone.group_id().unwrap()).num_liberties;
                    if liberties != 1 {
                        every_same_color_group_has_one_liberty = false;
                    }
                }
                c if c == opponent => {
                    let liberties = self.groups.get(stone.group_id().unwrap()).num_liberties;
                    if liberties == 1 {
                        no_opponent_group_has_one_liberty = false;
                    }
                }
                _ => unreachable!(),
            }
        }

        let is_suicide =
            no_empty_neighbor && every_same_color_group_has_one_liberty && no_opponent_group_has_one_liberty;

        if is_suicide {
            MoveClass::Illegal
        } else if !no_opponent_group_has_one_liberty {
            MoveClass::Capture
        } else {
            MoveClass::NoCapture
        }
    }

    /// If `point` is empty and every on-board neighbor is the same color,
    /// returns that color; otherwise `Color::Empty`.
    pub fn is_koish(&self, point: Point) -> Color {
        if !point.is_on_board(self.size) || !self.stones[point.index()].color().is_empty() {
            return Color::Empty;
        }

        let mut neighbor_color: Option<Color> = None;
        for neighbor in point.neighbors(self.size) {
            let color = self.stones[neighbor.index()].color();
            if color.is_empty() {
                return Color::Empty;
            }
            match neighbor_color {
                None => neighbor_color = Some(color),
                Some(c) if c != color => return Color::Empty,
                _ => {}
            }
        }

        neighbor_color.unwrap_or(Color::Empty)
    }

    /// The resulting `stone_hash` if `color` played at `point`, without
    /// mutating `self`. Used for superko checks.
    fn candidate_stone_hash(&self, point: Point, color: Color) -> u64 {
        let mut hash = self.stone_hash;

        for (_gid, seed) in self.groups_captured_by(point, color) {
            for member in self.flood_members(seed) {
                hash ^= zobrist::move_hash(member, self.stones[member.index()].color());
            }
        }

        hash ^ zobrist::move_hash(point, color)
    }

    /// All points belonging to the same group as the stone at `seed`.
    fn flood_members(&self, seed: Point) -> Vec<Point> {
        let stone = self.stones[seed.index()];
        let gid = stone.group_id().expect("flood_members seed must be occupied");

        let mut visited = vec![false; self.area()];
        let mut stack = vec![seed];
        let mut members = Vec::new();
        visited[seed.index()] = true;

        while let Some(point) = stack.pop() {
            members.push(point);
            for neighbor in point.neighbors(self.size) {
                if visited[neighbor.index()] {
                    continue;
                }
                let s = self.stones[neighbor.index()];
                if s.group_id() == Some(gid) {
                    visited[neighbor.index()] = true;
                    stack.push(neighbor);
                }
            }
        }

        members
    }

    fn recompute_group_stats(&mut self, gid: GroupId, seed: Point) {
        let members = self.flood_members(seed);
        let mut liberties = HashSet::new();

        for &point in &members {
            for neighbor in point.neighbors(self.size) {
                if self.stones[neighbor.index()].color().is_empty() {
                    liberties.insert(neighbor);
                }
            }
        }

        let group = self.groups.get_mut(gid);
        group.size = members.len() as u16;
        group.num_liberties = liberties.len() as u16;
    }

    // -- move application ------------------------------------------------

    pub fn play_move(&mut self, point: Point) -> UndoMove {
        assert!(self.is_legal(point), "illegal move: {:?}", point);
        self.play_move_as(point, self.to_play)
    }

    /// Plays `point` as `color`, without checking legality. Intended for
    /// constructing test/scenario positions out of turn order; ordinary
    /// search code should call `play_move`.
    pub fn play_move_as(&mut self, point: Point, color: Color) -> UndoMove {
        let prev = ScalarSnapshot {
            ko: self.ko,
            to_play: self.to_play,
            n: self.n,
            stone_hash: self.stone_hash,
            num_captures: self.num_captures,
            legal_moves: self.legal_moves.clone(),
        };

        if point.is_pass(self.size) || point.is_resign(self.size) {
            self.ko = Point::invalid();
            self.n += 1;
            self.to_play = color.opposite();
            self.recompute_legal_moves(None);

            return UndoMove {
                point,
                prev,
                changed_stones: Vec::new(),
                changed_groups: Vec::new(),
            };
        }

        let opponent = color.opposite();
        let mut changed_stones: Vec<(Point, Stone)> = Vec::new();
        let mut changed_groups: Vec<(GroupId, Option<Group>)> = Vec::new();
        let mut snapshotted: HashSet<GroupId> = HashSet::new();

        let captured = self.groups_captured_by(point, color);
        let friendly = self.groups_friendly_to(point, color);

        // Gather member lists before any mutation.
        let captured_members: Vec<(GroupId, Vec<Point>)> = captured
            .iter()
            .map(|&(gid, seed)| (gid, self.flood_members(seed)))
            .collect();
        let friendly_members: Vec<(GroupId, Vec<Point>)> = friendly
            .iter()
            .map(|&(gid, seed)| (gid, self.flood_members(seed)))
            .collect();

        // Friendly chains that border a captured chain elsewhere on the
        // board (not necessarily adjacent to `point` itself) also gain
        // liberties and must be recomputed.
        let friendly_ids: HashSet<GroupId> = friendly.iter().map(|&(g, _)| g).collect();
        let mut border_seed: Vec<(GroupId, Point)> = Vec::new();
        for (_, members) in &captured_members {
            for &member in members {
                for neighbor in member.neighbors(self.size) {
                    let stone = self.stones[neighbor.index()];
                    if stone.color() == color {
                        if let Some(gid) = stone.group_id() {
                            if !friendly_ids.contains(&gid) && !border_seed.iter().any(|&(g, _)| g == gid) {
                                border_seed.push((gid, neighbor));
                            }
                        }
                    }
                }
            }
        }

        // Snapshot every group we are about to touch, before mutating any.
        for &(gid, _) in &captured {
            if snapshotted.insert(gid) {
                changed_groups.push((gid, Some(*self.groups.get(gid))));
            }
        }
        for &(gid, _) in &friendly {
            if snapshotted.insert(gid) {
                changed_groups.push((gid, Some(*self.groups.get(gid))));
            }
        }
        for &(gid, _) in &border_seed {
            if snapshotted.insert(gid) {
                changed_groups.push((gid, Some(*self.groups.get(gid))));
            }
        }

        // Place the stone (captured stones are still on the board at this
        // point, so the pre-move value here is always `Stone::EMPTY`).
        changed_stones.push((point, self.stones[point.index()]));

        // Remove captured stones.
        let mut total_captured = 0u32;
        let mut single_captured_point = Point::invalid();
        for (gid, members) in &captured_members {
            for &member in members {
                let old = self.stones[member.index()];
                changed_stones.push((member, old));
                self.stone_hash ^= zobrist::move_hash(member, old.color());
                self.stones[member.index()] = Stone::EMPTY;
            }
            total_captured += members.len() as u32;
            if members.len() == 1 {
                single_captured_point = members[0];
            }
            self.groups.free(*gid);
        }
        self.num_captures[color_index(color)] += total_captured;

        // Allocate (or pick) the target group, merge friendly chains into it.
        let target_id = if friendly_members.is_empty() {
            let gid = self.groups.allocate(color);
            changed_groups.push((gid, None));
            gid
        } else {
            friendly_members[0].0
        };

        self.stones[point.index()] = Stone::new(color, target_id);
        self.stone_hash ^= zobrist::move_hash(point, color);

        for (gid, members) in friendly_members.iter().skip(1) {
            for &member in members {
                let old = self.stones[member.index()];
                changed_stones.push((member, old));
                self.stones[member.index()] = Stone::new(color, target_id);
            }
            self.groups.free(*gid);
        }

        self.recompute_group_stats(target_id, point);

        for (gid, seed) in &border_seed {
            if *gid == target_id {
                continue;
            }
            self.recompute_group_stats(*gid, *seed);
        }

        self.ko = if total_captured == 1 {
            let target = self.groups.get(target_id);
            if target.size == 1 && target.num_liberties == 1 {
                single_captured_point
            } else {
                Point::invalid()
            }
        } else {
            Point::invalid()
        };

        self.n += 1;
        self.to_play = opponent;
        self.recompute_legal_moves(None);

        UndoMove { point, prev, changed_stones, changed_groups }
    }

    pub fn undo_move(&mut self, undo: UndoMove) {
        for (point, stone) in undo.changed_stones {
            self.stones[point.index()] = stone;
        }

        // A single move can free a group id and then immediately reallocate
        // it (a capture with no friendly neighbor reuses the captured
        // group's slot for the new stone). `changed_groups` then carries two
        // entries for that id: the captured snapshot pushed first, and the
        // fresh-allocation marker pushed second. Only the first entry should
        // act -- restoring the captured group makes the id live again, and
        // the later `unallocate` must not then push that live id back onto
        // the free list.
        let mut reverted = HashSet::new();
        for (gid, group) in undo.changed_groups {
            if !reverted.insert(gid) {
                continue;
            }
            match group {
                Some(g) => self.groups.restore(gid, g),
                None => self.groups.unallocate(gid),
            }
        }

        self.ko = undo.prev.ko;
        self.to_play = undo.prev.to_play;
        self.n = undo.prev.n;
        self.stone_hash = undo.prev.stone_hash;
        self.num_captures = undo.prev.num_captures;
        self.legal_moves = undo.prev.legal_moves;
    }

    /// Recomputes `legal_moves` from scratch. If `superko` is provided, a
    /// candidate move is additionally rejected when it would recreate a
    /// previously-seen whole-board position.
    pub fn recompute_legal_moves(&mut self, superko: Option<&dyn SuperkoHistory>) {
        let size = self.size;
        for point in Point::all(size) {
            let legal = match self.classify_move_ignoring_superko(point) {
                MoveClass::Illegal => false,
                _ => match superko {
                    Some(history) => {
                        let candidate = self.candidate_stone_hash(point, self.to_play);
                        !history.has_position_been_played_before(candidate)
                    }
                    None => true,
                },
            };
            self.legal_moves[point.index()] = legal;
        }

        // The core always marks pass legal (see design notes on this open
        // question).
        self.legal_moves[Point::pass(size).index()] = true;
    }

    /// Clears legality for every point in `forbidden`, without ever
    /// touching pass. The core does not itself track game-level rules like
    /// "5 consecutive passes forbid play in pass-alive regions" -- this is
    /// the primitive a caller enforcing such a rule layers on top of a
    /// fresh `recompute_legal_moves`.
    pub fn restrict_legal_moves(&mut self, forbidden: &HashSet<Point>) {
        for &point in forbidden {
            self.legal_moves[point.index()] = false;
        }
    }

    pub fn calculate_score(&self, komi: f32) -> f32 {
        score::calculate_score(self, komi)
    }

    pub fn calculate_pass_alive_regions(&self) -> (HashSet<Point>, HashSet<Point>) {
        benson::pass_alive_points(self)
    }

    pub fn calculate_whole_board_pass_alive(&self) -> bool {
        benson::whole_board_pass_alive(self)
    }

    pub fn calculate_pass_alive_territory(&self) -> HashSet<Point> {
        benson::pass_alive_territory(self)
    }
}

fn color_index(color: Color) -> usize {
    match color {
        Color::Black => 0,
        Color::White => 1,
        Color::Empty => unreachable!("no capture count slot for Color::Empty"),
    }
}
