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

//! Shared hecs world and the movement step

use super::components::{Gaze, Locomotor, NpcTag, PlayerTag, Transform, TriggerShape, Velocity};
use crate::behavior::{CommandError, CommandResult};
use glam::{Quat, Vec3};
use hecs::{Entity, World};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tagalong_common::PlayerId;

/// Handle to the simulated world, shared by every adapter
#[derive(Clone, Default)]
pub struct SimWorld {
    inner: Arc<Mutex<World>>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, World> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn the NPC body
    pub fn spawn_npc(&self, position: Vec3, speed: f32) -> Entity {
        self.lock().spawn((
            NpcTag,
            Transform::at(position),
            Locomotor::new(speed),
            Gaze::default(),
        ))
    }

    /// Spawn a player drifting at `velocity`
    pub fn spawn_player(&self, id: PlayerId, position: Vec3, velocity: Vec3) -> Entity {
        self.lock()
            .spawn((PlayerTag(id), Transform::at(position), Velocity(velocity)))
    }

    /// Spawn a trigger volume
    pub fn spawn_trigger(&self, position: Vec3, radius: f32) -> Entity {
        self.lock()
            .spawn((TriggerShape { radius }, Transform::at(position)))
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.lock().contains(entity)
    }

    pub fn despawn(&self, entity: Entity) {
        if self.lock().despawn(entity).is_err() {
            tracing::debug!("Entity {:?} already despawned", entity);
        }
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.lock().get::<&Transform>(entity).ok().map(|t| *t)
    }

    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.transform(entity).map(|t| t.position)
    }

    pub fn rotation(&self, entity: Entity) -> Option<Quat> {
        self.transform(entity).map(|t| t.rotation)
    }

    /// Teleport `entity`; returns false if it has no transform
    pub fn set_position(&self, entity: Entity, position: Vec3) -> bool {
        match self.lock().get::<&mut Transform>(entity) {
            Ok(mut transform) => {
                transform.position = position;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_rotation(&self, entity: Entity, rotation: Quat) -> bool {
        match self.lock().get::<&mut Transform>(entity) {
            Ok(mut transform) => {
                transform.rotation = rotation;
                true
            }
            Err(_) => false,
        }
    }

    /// Current walk destination of `entity`
    pub fn destination(&self, entity: Entity) -> Option<Vec3> {
        self.lock()
            .get::<&Locomotor>(entity)
            .ok()
            .and_then(|l| l.destination)
    }

    /// Start walking `entity` toward `target`
    pub fn set_destination(&self, entity: Entity, target: Vec3) -> CommandResult {
        if !target.is_finite() {
            return Err(CommandError::Rejected(format!(
                "Destination is not finite: {}",
                target
            )));
        }
        match self.lock().get::<&mut Locomotor>(entity) {
            Ok(mut locomotor) => {
                locomotor.destination = Some(target);
                Ok(())
            }
            Err(_) => Err(CommandError::Unavailable),
        }
    }

    /// Yaw `entity` to face along the horizontal part of `direction`
    pub fn face(&self, entity: Entity, direction: Vec3) -> CommandResult {
        if direction.x == 0.0 && direction.z == 0.0 {
            return Err(CommandError::Rejected("Facing direction is vertical".to_string()));
        }
        let rotation = Quat::from_rotation_y(direction.x.atan2(direction.z));
        if self.set_rotation(entity, rotation) {
            Ok(())
        } else {
            Err(CommandError::Unavailable)
        }
    }

    pub fn gaze(&self, entity: Entity) -> Option<Gaze> {
        self.lock().get::<&Gaze>(entity).ok().map(|g| (*g).clone())
    }

    /// Mutate the gaze of `entity`; returns false if it has none
    pub fn update_gaze(&self, entity: Entity, f: impl FnOnce(&mut Gaze)) -> bool {
        match self.lock().get::<&mut Gaze>(entity) {
            Ok(mut gaze) => {
                f(&mut gaze);
                true
            }
            Err(_) => false,
        }
    }

    /// Advance every moving entity by `dt`
    pub fn step(&self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        let mut world = self.lock();

        for (transform, locomotor) in world.query_mut::<(&mut Transform, &mut Locomotor)>() {
            let Some(destination) = locomotor.destination else {
                continue;
            };
            let remaining = destination - transform.position;
            let distance = remaining.length();
            let stride = locomotor.speed * seconds;
            if distance <= stride {
                transform.position = destination;
                locomotor.destination = None;
            } else {
                transform.position += remaining / distance * stride;
            }
        }

        for (transform, velocity) in world.query_mut::<(&mut Transform, &Velocity)>() {
            transform.position += velocity.0 * seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npc_walks_to_destination() {
        let world = SimWorld::new();
        let npc = world.spawn_npc(Vec3::ZERO, 2.0);
        world.set_destination(npc, Vec3::new(3.0, 0.0, 0.0)).unwrap();

        world.step(Duration::from_secs(1));
        assert_eq!(world.position(npc), Some(Vec3::new(2.0, 0.0, 0.0)));

        world.step(Duration::from_secs(1));
        assert_eq!(world.position(npc), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(world.destination(npc), None);
    }

    #[test]
    fn test_players_drift_with_velocity() {
        let world = SimWorld::new();
        let player = world.spawn_player(PlayerId::new_v4(), Vec3::ZERO, Vec3::new(0.0, 0.0, 1.5));
        world.step(Duration::from_millis(2000));
        assert_eq!(world.position(player), Some(Vec3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn test_face_sets_yaw() {
        let world = SimWorld::new();
        let npc = world.spawn_npc(Vec3::ZERO, 1.0);
        world.face(npc, Vec3::new(1.0, 0.0, 0.0)).unwrap();

        let forward = world.rotation(npc).unwrap() * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);
        assert!(world.face(npc, Vec3::Y).is_err());
    }

    #[test]
    fn test_commands_on_despawned_entity_are_unavailable() {
        let world = SimWorld::new();
        let npc = world.spawn_npc(Vec3::ZERO, 1.0);
        world.despawn(npc);

        assert!(!world.contains(npc));
        assert_eq!(
            world.set_destination(npc, Vec3::X),
            Err(CommandError::Unavailable)
        );
        assert_eq!(world.position(npc), None);
    }
}
