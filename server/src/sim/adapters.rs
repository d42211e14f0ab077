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

//! Host trait implementations backed by [`SimWorld`]

use super::world::SimWorld;
use crate::behavior::{CommandResult, ConversationError};
use crate::host::{
    Attention, ConversationProvider, ListenMode, Locomotion, NpcAvatar, NpcEntity, Player,
    PlayerRef, TriggerEvent, TriggerVolume,
};
use async_trait::async_trait;
use glam::{Quat, Vec3};
use hecs::Entity;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tagalong_common::PlayerId;
use tokio::sync::mpsc;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted player
pub struct SimPlayer {
    world: SimWorld,
    entity: Entity,
    id: PlayerId,
}

impl SimPlayer {
    pub fn spawn(world: &SimWorld, position: Vec3, velocity: Vec3) -> Arc<Self> {
        let id = PlayerId::new_v4();
        let entity = world.spawn_player(id, position, velocity);
        Arc::new(Self {
            world: world.clone(),
            entity,
            id,
        })
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Remove the player from the world
    pub fn leave(&self) {
        self.world.despawn(self.entity);
    }
}

impl Player for SimPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn position(&self) -> Option<Vec3> {
        self.world.position(self.entity)
    }
}

/// The NPC body
pub struct SimAvatar {
    world: SimWorld,
    entity: Entity,
}

impl SimAvatar {
    pub fn spawn(world: &SimWorld, position: Vec3, speed: f32) -> Arc<Self> {
        let entity = world.spawn_npc(position, speed);
        Arc::new(Self {
            world: world.clone(),
            entity,
        })
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }
}

impl Locomotion for SimAvatar {
    fn position(&self) -> Vec3 {
        self.world.position(self.entity).unwrap_or_default()
    }

    fn rotation(&self) -> Quat {
        self.world.rotation(self.entity).unwrap_or_default()
    }

    fn move_to_position(&self, target: Vec3) -> CommandResult {
        self.world.set_destination(self.entity, target)
    }

    fn rotate_to(&self, direction: Vec3) -> CommandResult {
        self.world.face(self.entity, direction)
    }

    fn is_available(&self) -> bool {
        self.world.contains(self.entity)
    }
}

impl Attention for SimAvatar {
    fn add_attention_target(&self, player: PlayerId) {
        self.world.update_gaze(self.entity, |gaze| gaze.attend(player));
    }

    fn remove_attention_target(&self, player: PlayerId) {
        self.world.update_gaze(self.entity, |gaze| gaze.ignore(player));
    }

    fn set_look_at_target(&self, position: Vec3) -> CommandResult {
        if self
            .world
            .update_gaze(self.entity, |gaze| gaze.look_at = Some(position))
        {
            Ok(())
        } else {
            Err(crate::behavior::CommandError::Unavailable)
        }
    }

    fn clear_look_at_target(&self) {
        self.world.update_gaze(self.entity, |gaze| gaze.look_at = None);
    }
}

/// The NPC entity record
pub struct SimNpc {
    avatar: Option<Arc<SimAvatar>>,
    conversation_enabled: bool,
}

impl SimNpc {
    pub fn new(avatar: Option<Arc<SimAvatar>>, conversation_enabled: bool) -> Self {
        Self {
            avatar,
            conversation_enabled,
        }
    }
}

#[async_trait]
impl NpcEntity for SimNpc {
    fn is_conversation_enabled(&self) -> bool {
        self.conversation_enabled
    }

    async fn try_get_avatar(&self) -> Option<Arc<dyn NpcAvatar>> {
        self.avatar
            .clone()
            .map(|avatar| avatar as Arc<dyn NpcAvatar>)
    }
}

/// Trigger volume that broadcasts scripted clicks to every subscriber
pub struct SimTrigger {
    world: SimWorld,
    entity: Entity,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<TriggerEvent>>>,
}

impl SimTrigger {
    pub fn spawn(world: &SimWorld, position: Vec3, radius: f32) -> Arc<Self> {
        let entity = world.spawn_trigger(position, radius);
        Arc::new(Self {
            world: world.clone(),
            entity,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Raise a player-entered event; closed subscriptions are dropped
    pub fn click(&self, player: PlayerRef) {
        tracing::debug!(player = %player.id(), "Trigger clicked");
        lock(&self.subscribers)
            .retain(|tx| tx.send(TriggerEvent::PlayerEntered(player.clone())).is_ok());
    }
}

impl TriggerVolume for SimTrigger {
    fn set_position(&self, position: Vec3) {
        self.world.set_position(self.entity, position);
    }

    fn set_rotation(&self, rotation: Quat) {
        self.world.set_rotation(self.entity, rotation);
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TriggerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.subscribers).push(tx);
        rx
    }
}

/// A call received by [`SimConversation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationRecord {
    Registered(PlayerId),
    Listening(PlayerId, ListenMode),
}

/// Dialogue engine stand-in that logs and records every call
#[derive(Default)]
pub struct SimConversation {
    records: Mutex<Vec<ConversationRecord>>,
}

impl SimConversation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<ConversationRecord> {
        lock(&self.records).clone()
    }
}

#[async_trait]
impl ConversationProvider for SimConversation {
    async fn register_participant(&self, player: PlayerId) -> Result<(), ConversationError> {
        tracing::info!(%player, "Conversation participant registered");
        lock(&self.records).push(ConversationRecord::Registered(player));
        Ok(())
    }

    async fn start_listening_to(
        &self,
        player: PlayerId,
        mode: ListenMode,
    ) -> Result<(), ConversationError> {
        tracing::info!(%player, ?mode, "Listening to player");
        lock(&self.records).push(ConversationRecord::Listening(player, mode));
        Ok(())
    }
}
