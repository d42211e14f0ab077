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

//! Test fakes for the host collaborators

use crate::behavior::{CommandError, CommandResult, ConversationError};
use crate::host::{
    Attention, ConversationProvider, ListenMode, Locomotion, NpcAvatar, NpcEntity, Player,
    PlayerRef, TriggerEvent, TriggerVolume,
};
use async_trait::async_trait;
use glam::{Quat, Vec3};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tagalong_common::PlayerId;
use tokio::sync::mpsc;

/// Let spawned tasks run until they block again
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// A player with a settable position
pub struct FakePlayer {
    id: PlayerId,
    position: Mutex<Option<Vec3>>,
}

impl FakePlayer {
    pub fn at(position: Vec3) -> Arc<Self> {
        Arc::new(Self {
            id: PlayerId::new_v4(),
            position: Mutex::new(Some(position)),
        })
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn move_to(&self, position: Vec3) {
        *self.position.lock().unwrap() = Some(position);
    }

    /// Simulate the player leaving the world
    pub fn leave(&self) {
        *self.position.lock().unwrap() = None;
    }
}

impl Player for FakePlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn position(&self) -> Option<Vec3> {
        *self.position.lock().unwrap()
    }
}

/// Everything a [`RecordingAvatar`] was asked to do
#[derive(Debug, Clone, Default)]
pub struct AvatarLog {
    pub moves: Vec<Vec3>,
    pub rotations: Vec<Vec3>,
    pub look_at_sets: Vec<Vec3>,
    pub look_at_clears: usize,
    /// Current look-at target
    pub look_at: Option<Vec3>,
    /// Current attention targets
    pub attention: Vec<PlayerId>,
    pub attention_added: Vec<PlayerId>,
    pub attention_removed: Vec<PlayerId>,
}

/// An NPC body that records every command. Commands never change its
/// transform; tests move it explicitly.
pub struct RecordingAvatar {
    position: Mutex<Vec3>,
    rotation: Mutex<Quat>,
    log: Mutex<AvatarLog>,
    rejection: Mutex<Option<CommandError>>,
    available: AtomicBool,
}

impl RecordingAvatar {
    pub fn at(position: Vec3) -> Arc<Self> {
        Arc::new(Self {
            position: Mutex::new(position),
            rotation: Mutex::new(Quat::IDENTITY),
            log: Mutex::new(AvatarLog::default()),
            rejection: Mutex::new(None),
            available: AtomicBool::new(true),
        })
    }

    pub fn set_position(&self, position: Vec3) {
        *self.position.lock().unwrap() = position;
    }

    pub fn set_rotation(&self, rotation: Quat) {
        *self.rotation.lock().unwrap() = rotation;
    }

    /// Fail every subsequent command with `error` (still recorded)
    pub fn reject_commands(&self, error: CommandError) {
        *self.rejection.lock().unwrap() = Some(error);
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn log(&self) -> AvatarLog {
        self.log.lock().unwrap().clone()
    }

    fn outcome(&self) -> CommandResult {
        match self.rejection.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Locomotion for RecordingAvatar {
    fn position(&self) -> Vec3 {
        *self.position.lock().unwrap()
    }

    fn rotation(&self) -> Quat {
        *self.rotation.lock().unwrap()
    }

    fn move_to_position(&self, target: Vec3) -> CommandResult {
        self.log.lock().unwrap().moves.push(target);
        self.outcome()
    }

    fn rotate_to(&self, direction: Vec3) -> CommandResult {
        self.log.lock().unwrap().rotations.push(direction);
        self.outcome()
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

impl Attention for RecordingAvatar {
    fn add_attention_target(&self, player: PlayerId) {
        let mut log = self.log.lock().unwrap();
        log.attention_added.push(player);
        if !log.attention.contains(&player) {
            log.attention.push(player);
        }
    }

    fn remove_attention_target(&self, player: PlayerId) {
        let mut log = self.log.lock().unwrap();
        log.attention_removed.push(player);
        log.attention.retain(|p| *p != player);
    }

    fn set_look_at_target(&self, position: Vec3) -> CommandResult {
        {
            let mut log = self.log.lock().unwrap();
            log.look_at_sets.push(position);
            log.look_at = Some(position);
        }
        self.outcome()
    }

    fn clear_look_at_target(&self) {
        let mut log = self.log.lock().unwrap();
        log.look_at_clears += 1;
        log.look_at = None;
    }
}

/// A trigger volume that records syncs and fires events on demand
pub struct FakeTrigger {
    position: Mutex<Vec3>,
    rotation: Mutex<Quat>,
    syncs: AtomicUsize,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<TriggerEvent>>>,
}

impl FakeTrigger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            position: Mutex::new(Vec3::ZERO),
            rotation: Mutex::new(Quat::IDENTITY),
            syncs: AtomicUsize::new(0),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn position(&self) -> Vec3 {
        *self.position.lock().unwrap()
    }

    pub fn rotation(&self) -> Quat {
        *self.rotation.lock().unwrap()
    }

    /// Number of position syncs received
    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Raise a player-entered event
    pub fn fire(&self, player: PlayerRef) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(TriggerEvent::PlayerEntered(player.clone())).is_ok());
    }
}

impl TriggerVolume for FakeTrigger {
    fn set_position(&self, position: Vec3) {
        *self.position.lock().unwrap() = position;
        self.syncs.fetch_add(1, Ordering::SeqCst);
    }

    fn set_rotation(&self, rotation: Quat) {
        *self.rotation.lock().unwrap() = rotation;
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TriggerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

/// NPC entity with a fixed avatar
pub struct FakeNpc {
    avatar: Option<Arc<RecordingAvatar>>,
    conversation_enabled: bool,
}

impl FakeNpc {
    pub fn with_avatar(avatar: Arc<RecordingAvatar>) -> Arc<Self> {
        Arc::new(Self {
            avatar: Some(avatar),
            conversation_enabled: true,
        })
    }

    pub fn without_avatar() -> Arc<Self> {
        Arc::new(Self {
            avatar: None,
            conversation_enabled: true,
        })
    }

    pub fn conversation_disabled(avatar: Arc<RecordingAvatar>) -> Arc<Self> {
        Arc::new(Self {
            avatar: Some(avatar),
            conversation_enabled: false,
        })
    }
}

#[async_trait]
impl NpcEntity for FakeNpc {
    fn is_conversation_enabled(&self) -> bool {
        self.conversation_enabled
    }

    async fn try_get_avatar(&self) -> Option<Arc<dyn NpcAvatar>> {
        self.avatar
            .clone()
            .map(|avatar| avatar as Arc<dyn NpcAvatar>)
    }
}

/// Dialogue engine that records participants and listen requests
#[derive(Default)]
pub struct RecordingConversation {
    registered: Mutex<Vec<PlayerId>>,
    listening: Mutex<Vec<(PlayerId, ListenMode)>>,
    failure: Mutex<Option<ConversationError>>,
}

impl RecordingConversation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail every registration with `error`
    pub fn fail_with(&self, error: ConversationError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn registered(&self) -> Vec<PlayerId> {
        self.registered.lock().unwrap().clone()
    }

    pub fn listening(&self) -> Vec<(PlayerId, ListenMode)> {
        self.listening.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationProvider for RecordingConversation {
    async fn register_participant(&self, player: PlayerId) -> Result<(), ConversationError> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.registered.lock().unwrap().push(player);
        Ok(())
    }

    async fn start_listening_to(
        &self,
        player: PlayerId,
        mode: ListenMode,
    ) -> Result<(), ConversationError> {
        self.listening.lock().unwrap().push((player, mode));
        Ok(())
    }
}
