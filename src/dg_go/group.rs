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

use crate::color::Color;
use crate::point::MAX_NUM_POINTS;

/// A stable 16-bit handle into a `GroupPool`. Not refcounted; lifetime is
/// managed explicitly by whoever allocates and frees it (the `Position`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GroupId(u16);

impl GroupId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u16 {
        self.0
    }
}

impl From<u16> for GroupId {
    fn from(value: u16) -> GroupId {
        GroupId(value)
    }
}

/// A connected chain of same-color stones: its size and liberty count. The
/// chain's color is tracked separately by whichever slot in `stones[]` holds
/// the chain's stones, so it is not duplicated here.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Group {
    pub size: u16,
    pub num_liberties: u16,
    pub color: Color,
}

impl Group {
    fn new(color: Color) -> Group {
        Group { size: 0, num_liberties: 0, color }
    }
}

/// Pool of `Group` records indexed by `GroupId`. Freed ids are pushed onto a
/// stack and handed back out LIFO, so that a burst of captures followed by a
/// burst of new groups reuses the most recently freed slots first -- this
/// keeps the live id range small without needing a full compaction pass.
#[derive(Debug, Clone)]
pub struct GroupPool {
    slots: Vec<Group>,
    free: Vec<u16>,
}

impl GroupPool {
    pub fn new() -> GroupPool {
        GroupPool {
            slots: Vec::with_capacity(MAX_NUM_POINTS),
            free: Vec::new(),
        }
    }

    /// Allocates a fresh, zeroed group of the given color.
    pub fn allocate(&mut self, color: Color) -> GroupId {
        if let Some(id) = self.free.pop() {
            self.slots[id as usize] = Group::new(color);
            GroupId(id)
        } else {
            let id = self.slots.len() as u16;
            self.slots.push(Group::new(color));
            GroupId(id)
        }
    }

    /// Returns `id` to the free list. The caller must not reference `id`
    /// again until (unless) it is handed back out by a future `allocate`.
    pub fn free(&mut self, id: GroupId) {
        self.free.push(id.0);
    }

    pub fn get(&self, id: GroupId) -> &Group {
        &self.slots[id.index()]
    }

    pub fn get_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.slots[id.index()]
    }

    /// Restores a previously-snapshotted group record at `id`, removing
    /// `id` from the free list if it is on it. Used by `Position::undo_move`
    /// to bring a captured-then-undone group back to life.
    pub fn restore(&mut self, id: GroupId, group: Group) {
        self.slots[id.index()] = group;

        if let Some(pos) = self.free.iter().position(|&x| x == id.0) {
            self.free.swap_remove(pos);
        }
    }

    /// Returns `id` to the free list without touching its slot contents.
    /// Used to undo a fresh allocation that had no prior record to restore.
    pub fn unallocate(&mut self, id: GroupId) {
        self.free.push(id.0);
    }
}

impl Default for GroupPool {
    fn default() -> GroupPool {
        GroupPool::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_ids_are_reused_lifo() {
        let mut pool = GroupPool::new();

        let a = pool.allocate(Color::Black);
        let b = pool.allocate(Color::Black);
        let c = pool.allocate(Color::White);

        pool.free(b);
        pool.free(c);

        // LIFO: c was freed last, so it comes back first.
        let reused_c = pool.allocate(Color::White);
        assert_eq!(reused_c, c);

        let reused_b = pool.allocate(Color::Black);
        assert_eq!(reused_b, b);

        let fresh = pool.allocate(Color::Black);
        assert_ne!(fresh, a);
        assert_ne!(fresh, b);
        assert_ne!(fresh, c);
    }

    #[test]
    fn allocated_group_starts_empty() {
        let mut pool = GroupPool::new();
        let id = pool.allocate(Color::Black);

        assert_eq!(pool.get(id).size, 0);
        assert_eq!(pool.get(id).num_liberties, 0);
    }
}
