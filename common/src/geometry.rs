//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Planar (horizontal x/z) geometry helpers
//!
//! NPC motion ignores the vertical axis: distances and directions are taken
//! on the ground plane and the y coordinate is carried through unchanged.

use glam::{Vec2, Vec3};

/// Horizontal offset from `from` to `to` as `(dx, dz)`
pub fn planar_offset(from: Vec3, to: Vec3) -> Vec2 {
    Vec2::new(to.x - from.x, to.z - from.z)
}

/// Horizontal distance between two points
pub fn planar_distance(from: Vec3, to: Vec3) -> f32 {
    planar_offset(from, to).length()
}

/// Point on the horizontal circle of `radius` around `center` at `angle`
/// radians, keeping the center's height.
pub fn ring_point(center: Vec3, angle: f32, radius: f32) -> Vec3 {
    Vec3::new(
        center.x + angle.cos() * radius,
        center.y,
        center.z + angle.sin() * radius,
    )
}
