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

//! Host collaborator interfaces
//!
//! The behavior runtime never moves, renders or talks on its own. Everything
//! with an outside effect goes through one of these traits, implemented by the
//! hosting engine (or by [`crate::sim`] for the bundled simulation).
//!
//! # Collaborators
//!
//! - [`Player`]: a player that can trigger the NPC; identity and position only
//! - [`Locomotion`]: NPC transform reads and movement/orientation commands
//! - [`Attention`]: attention targets and head/eye look-at
//! - [`NpcEntity`]: the NPC entity itself, resolved once at startup
//! - [`TriggerVolume`]: the clickable hit-volume and its player-enter events
//! - [`ConversationProvider`]: the dialogue engine

use crate::behavior::{CommandResult, ConversationError};
use async_trait::async_trait;
use glam::{Quat, Vec3};
use std::fmt;
use std::sync::Arc;
use tagalong_common::PlayerId;
use tokio::sync::mpsc;

/// A player that can interact with the NPC
pub trait Player: Send + Sync {
    /// Stable identity used for all comparisons
    fn id(&self) -> PlayerId;

    /// Current world position, or `None` once the player is gone
    fn position(&self) -> Option<Vec3>;
}

/// Shared handle to a player as delivered by the host
pub type PlayerRef = Arc<dyn Player>;

/// Movement and transform access for the NPC body
pub trait Locomotion: Send + Sync {
    /// Current world position of the NPC
    fn position(&self) -> Vec3;

    /// Current world rotation of the NPC
    fn rotation(&self) -> Quat;

    /// Ask the pathing engine to walk to `target`
    fn move_to_position(&self, target: Vec3) -> CommandResult;

    /// Turn the NPC body to face along `direction`
    fn rotate_to(&self, direction: Vec3) -> CommandResult;

    /// Whether the NPC body can still be driven
    fn is_available(&self) -> bool {
        true
    }
}

/// Attention and look-at control for the NPC
pub trait Attention: Send + Sync {
    fn add_attention_target(&self, player: PlayerId);

    fn remove_attention_target(&self, player: PlayerId);

    /// Point head and eyes at a world position
    fn set_look_at_target(&self, position: Vec3) -> CommandResult;

    fn clear_look_at_target(&self);
}

/// The drivable NPC body: locomotion plus attention
pub trait NpcAvatar: Locomotion + Attention {}

impl<T: Locomotion + Attention + ?Sized> NpcAvatar for T {}

/// The NPC entity as registered with the host
#[async_trait]
pub trait NpcEntity: Send + Sync {
    /// Whether the host has conversation support turned on for this NPC
    fn is_conversation_enabled(&self) -> bool;

    /// Resolve the drivable avatar, if the NPC has one
    async fn try_get_avatar(&self) -> Option<Arc<dyn NpcAvatar>>;
}

/// Event raised by a trigger volume
#[derive(Clone)]
pub enum TriggerEvent {
    /// A player entered (clicked) the volume
    PlayerEntered(PlayerRef),
}

impl fmt::Debug for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::PlayerEntered(player) => f
                .debug_tuple("PlayerEntered")
                .field(&player.id())
                .finish(),
        }
    }
}

/// The clickable hit-volume that travels with the NPC
pub trait TriggerVolume: Send + Sync {
    fn set_position(&self, position: Vec3);

    fn set_rotation(&self, rotation: Quat);

    /// Subscribe to events raised by this volume, in the order they happen
    fn subscribe(&self) -> mpsc::UnboundedReceiver<TriggerEvent>;
}

/// How the dialogue engine decides when to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenMode {
    /// The engine responds on its own once the player stops talking
    Automatic,
    /// The engine waits for an explicit response request. The behavior
    /// itself always listens automatically; hosts may use this mode when
    /// driving a provider directly.
    Manual,
}

/// Dialogue engine bound to one NPC
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationProvider: Send + Sync {
    /// Add the player to the NPC's conversation
    async fn register_participant(&self, player: PlayerId) -> Result<(), ConversationError>;

    /// Start listening to the player's speech
    async fn start_listening_to(
        &self,
        player: PlayerId,
        mode: ListenMode,
    ) -> Result<(), ConversationError>;
}
