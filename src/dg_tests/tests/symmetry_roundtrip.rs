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

use dg_go::features::Features;
use dg_go::symmetry::Symmetry;
use dg_go::{zobrist, Point, Position};

fn setup() {
    zobrist::ensure_initialized();
}

/// Building features from a real, asymmetric position, applying every
/// symmetry's forward transform followed by its own inverse, must recover
/// the original stone plane exactly.
#[test]
fn feature_plane_round_trips_through_every_symmetry() {
    setup();
    let size = 9;
    let mut position = Position::new(size);
    for (x, y) in [(2, 2), (3, 5), (6, 1)] {
        position.play_move(Point::from_xy(x, y, size));
    }

    let features = Features::initialize(&position);
    let area = size as usize * size as usize;
    let plane0: Vec<f32> = features.as_slice()[..area].iter().map(|v| v.to_f32()).collect();

    for &sym in &Symmetry::ALL {
        let forward = sym.apply_plane(&plane0, size);
        let back = sym.inverse().apply_plane(&forward, size);
        assert_eq!(back, plane0, "symmetry {:?} did not round-trip a real feature plane", sym);
    }
}

/// The policy vector produced by a predictor has a trailing pass slot that
/// every symmetry must leave untouched when un-augmenting a policy back to
/// board orientation.
#[test]
fn policy_un_augmentation_preserves_the_pass_slot() {
    let size = 9u8;
    let area = size as usize * size as usize;
    let mut policy: Vec<f32> = (0..area).map(|i| i as f32 / area as f32).collect();
    policy.push(0.123); // pass

    for &sym in &Symmetry::ALL {
        let augmented = sym.apply_policy(&policy, size);
        let restored = sym.inverse().apply_policy(&augmented, size);
        assert_eq!(restored[area], 0.123);
        assert_eq!(restored, policy);
    }
}
