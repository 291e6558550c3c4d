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

//! The evaluator contract the search engine depends on: a single
//! `run`/`name`/`new_instance` capability interface. Actual model loading
//! and GPU inference are external collaborators; this crate only defines
//! the boundary and a couple of deterministic stand-ins used by tests and
//! demos.

pub mod predictor;

pub use predictor::{Inference, Predictor, Request};
