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

//! Simulation components

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tagalong_common::PlayerId;

/// World transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    /// Unrotated transform at `position`
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Walks toward a destination at a fixed speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Locomotor {
    /// Metres per second
    pub speed: f32,
    pub destination: Option<Vec3>,
}

impl Locomotor {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            destination: None,
        }
    }
}

/// Constant drift, used for scripted players
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

/// Where an NPC is looking and who it pays attention to
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gaze {
    pub look_at: Option<Vec3>,
    pub attention: Vec<PlayerId>,
}

impl Gaze {
    pub fn attend(&mut self, player: PlayerId) {
        if !self.attention.contains(&player) {
            self.attention.push(player);
        }
    }

    pub fn ignore(&mut self, player: PlayerId) {
        self.attention.retain(|p| *p != player);
    }
}

/// Marks a player entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTag(pub PlayerId);

/// Marks the NPC entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NpcTag;

/// Spherical clickable volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerShape {
    pub radius: f32,
}
