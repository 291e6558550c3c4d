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
use dg_utils::types::f16;

/// One leaf submitted for evaluation: its feature tensor (already under
/// `symmetry`) plus the symmetry the caller must invert on the returned
/// policy.
pub struct Request {
    pub features: Vec<f16>,
    pub symmetry: Symmetry,
}

/// A policy/value pair returned for one `Request`. `policy` has one entry
/// per on-board point plus one for pass, still under `symmetry` -- the
/// caller is responsible for applying `symmetry.inverse()`.
#[derive(Debug, Clone)]
pub struct Inference {
    pub policy: Vec<f32>,
    pub value: f32,
}

/// The only polymorphism the search engine needs from a model: run a
/// batch, report a name for logging, and manufacture sibling instances for
/// multi-threaded fan-out. Implementations must be safe to share across
/// threads and are expected to internally batch concurrent calls.
pub trait Predictor: Send + Sync {
    /// Runs a full batch of requests and returns one inference per
    /// request, in the same order.
    fn predict(&self, batch: &[Request]) -> Vec<Inference>;

    /// A short name for logging, e.g. the weights file basename.
    fn name(&self) -> &str;

    /// Builds an independent instance suitable for use on another thread.
    fn new_instance(&self) -> Box<dyn Predictor>;
}

/// A deterministic stand-in used by tests and demos: uniform policy over
/// legal-shaped output, value zero. Never touches `features`, so it is
/// cheap enough to run inline in property tests.
#[derive(Debug, Clone, Default)]
pub struct RandomPredictor {
    num_outputs: usize,
}

impl RandomPredictor {
    pub fn new(size: u8) -> RandomPredictor {
        RandomPredictor { num_outputs: size as usize * size as usize + 1 }
    }
}

impl Predictor for RandomPredictor {
    fn predict(&self, batch: &[Request]) -> Vec<Inference> {
        let n = self.num_outputs.max(1);
        let uniform = 1.0 / n as f32;

        batch
            .iter()
            .map(|_| Inference { policy: vec![uniform; n], value: 0.0 })
            .collect()
    }

    fn name(&self) -> &str {
        "random"
    }

    fn new_instance(&self) -> Box<dyn Predictor> {
        Box::new(self.clone())
    }
}

/// A predictor that always returns NaN, used to exercise error paths in
/// tests (model inference failures must be surfaced, not swallowed).
#[derive(Debug, Clone, Default)]
pub struct NanPredictor {
    num_outputs: usize,
}

impl NanPredictor {
    pub fn new(size: u8) -> NanPredictor {
        NanPredictor { num_outputs: size as usize * size as usize + 1 }
    }
}

impl Predictor for NanPredictor {
    fn predict(&self, batch: &[Request]) -> Vec<Inference> {
        let n = self.num_outputs.max(1);

        batch
            .iter()
            .map(|_| Inference { policy: vec![f32::NAN; n], value: f32::NAN })
            .collect()
    }

    fn name(&self) -> &str {
        "nan"
    }

    fn new_instance(&self) -> Box<dyn Predictor> {
        Box::new(self.clone())
    }
}
