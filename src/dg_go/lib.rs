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

//! The core Go board representation: colors, points, groups, Zobrist
//! hashing, a mutable `Position` with legal-move generation and scoring, and
//! the coordinate and dihedral-symmetry grammars built on top of it.

mod color;
mod point;
mod group;
mod benson;
mod score;

pub mod coord;
pub mod position;
pub mod symmetry;
pub mod features;
pub mod zobrist;

pub use color::Color;
pub use point::Point;
pub use group::{Group, GroupId};
pub use position::{MoveClass, Position, UndoMove};
pub use score::Score;
