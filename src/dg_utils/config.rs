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

//! Process-wide configuration read once from the environment. The process
//! bootstrap (outside this crate) is responsible for translating command-line
//! flags into the environment variables below before the first `Position` or
//! `Player` is constructed.

use std::env;

/// Parses an environment variable, falling back to `default` if it is unset
/// or fails to parse.
fn from_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

lazy_static! {
    /// The number of worker threads to use for self-play and evaluation.
    pub static ref NUM_THREADS: usize = from_env("NUM_THREADS", 4);

    /// The number of games to play in parallel during self-play.
    pub static ref NUM_GAMES: usize = from_env("NUM_GAMES", 16);

    /// The minimum number of readouts (tree visits) to perform before a move
    /// is picked, unless overridden per-search through `Options`.
    pub static ref NUM_ROLLOUT: usize = from_env("NUM_ROLLOUT", 1600);

    /// The maximum number of leaf positions to batch into a single inference
    /// call to the model.
    pub static ref BATCH_SIZE: usize = from_env("BATCH_SIZE", 16);

    /// The temperature to use for the early-game soft pick.
    pub static ref TEMPERATURE: f32 = from_env("TEMPERATURE", 1.0);
}
