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

//! The PUCT tree search: an arena of nodes with inline edge statistics, a
//! batched selection/expansion/backup loop, and the player that drives it.

mod cache;
mod choose;
mod node;
pub mod time_control;
mod tree;

pub mod player;

pub use cache::InferenceCache;
pub use node::EdgeStats;
pub use player::{Options, Player};
pub use tree::{NodeIndex, Tree};
