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

//! Per-NPC behavior controller
//!
//! [`NpcBehavior`] owns the session state of one NPC and turns trigger clicks
//! into mode changes:
//!
//! - a double click by the bound player toggles following
//! - a double click by anyone else takes the NPC over and starts following
//! - a single click waits out the double-click window, then starts a
//!   conversation unless the NPC is already following that player
//!
//! Three independent loops run next to the click handler: follow motion (one
//! per engagement), idle wandering and trigger-volume sync. None of them holds
//! the state lock across an await on a collaborator.
//!
//! # Examples
//!
//! ```ignore
//! let behavior = NpcBehavior::start(config, Collaborators {
//!     npc,
//!     trigger: Some(trigger),
//!     conversation,
//! })
//! .await?;
//!
//! // Events from the trigger volume are pumped automatically; hosts without
//! // a subscription can feed them directly.
//! behavior.player_entered(player).await;
//!
//! let snapshot = behavior.snapshot().await;
//! behavior.shutdown().await;
//! ```

use super::click::{ClickKind, classify};
use super::config::BehaviorConfig;
use super::conversation::{ConversationBridge, Engagement};
use super::error::{BehaviorError, BehaviorResult};
use super::state::{BehaviorSnapshot, BehaviorState};
use super::{follow, tracker, wander};
use crate::host::{
    ConversationProvider, NpcAvatar, NpcEntity, PlayerRef, TriggerEvent, TriggerVolume,
};
use std::sync::Arc;
use tagalong_common::PlayerId;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Everything the behavior needs from its host
pub struct Collaborators {
    /// The NPC entity the behavior drives
    pub npc: Arc<dyn NpcEntity>,
    /// The clickable volume; required
    pub trigger: Option<Arc<dyn TriggerVolume>>,
    /// Dialogue engine for this NPC
    pub conversation: Arc<dyn ConversationProvider>,
}

/// State and collaborators shared by the click handler and every loop
pub(crate) struct Shared {
    pub config: BehaviorConfig,
    pub avatar: Arc<dyn NpcAvatar>,
    pub conversation: ConversationBridge,
    pub state: Mutex<BehaviorState>,
    pub shutdown: CancellationToken,
}

/// Handle to a running NPC behavior
#[derive(Clone)]
pub struct NpcBehavior {
    shared: Arc<Shared>,
}

impl NpcBehavior {
    /// Start the behavior for one NPC.
    ///
    /// Fails without scheduling anything if the configuration is invalid, no
    /// trigger is configured, conversation is disabled or the NPC has no
    /// avatar. The failure is logged before it is returned.
    pub async fn start(
        config: BehaviorConfig,
        collaborators: Collaborators,
    ) -> BehaviorResult<Self> {
        match Self::initialize(config, collaborators).await {
            Ok(behavior) => Ok(behavior),
            Err(e) => {
                tracing::error!("{}", e);
                Err(e)
            }
        }
    }

    async fn initialize(
        config: BehaviorConfig,
        collaborators: Collaborators,
    ) -> BehaviorResult<Self> {
        config.validate()?;

        let trigger = collaborators
            .trigger
            .ok_or(BehaviorError::MissingTrigger)?;

        if !collaborators.npc.is_conversation_enabled() {
            return Err(BehaviorError::ConversationDisabled);
        }

        let avatar = collaborators
            .npc
            .try_get_avatar()
            .await
            .ok_or(BehaviorError::MissingAvatar)?;

        let home = avatar.position();
        let shared = Arc::new(Shared {
            conversation: ConversationBridge::new(collaborators.conversation, avatar.clone()),
            avatar: avatar.clone(),
            state: Mutex::new(BehaviorState::new(home)),
            shutdown: CancellationToken::new(),
            config,
        });
        let behavior = Self { shared };

        tracker::spawn(avatar, trigger.clone(), behavior.shared.shutdown.clone());
        behavior.spawn_event_pump(trigger.subscribe());
        wander::spawn(behavior.shared.clone());

        tracing::info!(
            "NPC behavior started at home ({:.2}, {:.2}, {:.2})",
            home.x,
            home.y,
            home.z
        );
        Ok(behavior)
    }

    /// Configuration the behavior was started with
    pub fn config(&self) -> &BehaviorConfig {
        &self.shared.config
    }

    /// Whether `shutdown` has been called
    pub fn is_running(&self) -> bool {
        !self.shared.shutdown.is_cancelled()
    }

    /// Copy of the current session state
    pub async fn snapshot(&self) -> BehaviorSnapshot {
        self.shared.state.lock().await.snapshot()
    }

    /// Handle a raw "player entered trigger" event.
    ///
    /// Events must be delivered in arrival order; the trigger subscription
    /// pump already does so.
    pub async fn player_entered(&self, player: PlayerRef) {
        if !self.is_running() {
            return;
        }

        let now = Instant::now();
        let mut state = self.shared.state.lock().await;
        let previous = state.record_click(now);
        let kind = classify(now, previous, self.shared.config.click_threshold());

        metrics::counter!("behavior.clicks", "kind" => kind.label()).increment(1);
        tracing::debug!(player = %player.id(), %kind, "Trigger click");

        match kind {
            ClickKind::Double => {
                self.handle_double_click(&mut state, &player);
                if let Some(pending) = state.pending_click().player() {
                    tracing::debug!(player = %pending, "Cancelling pending single click");
                }
                state.pending_click_mut().cancel();
            }
            ClickKind::Single => self.schedule_single_click(&mut state, player),
        }
    }

    /// Stop every loop and drop any pending single click
    pub async fn shutdown(&self) {
        self.shared.shutdown.cancel();
        self.shared.state.lock().await.pending_click_mut().cancel();
        tracing::info!("NPC behavior stopped");
    }

    fn handle_double_click(&self, state: &mut BehaviorState, player: &PlayerRef) {
        let id = player.id();

        if state.is_bound_to(id) {
            if state.is_following() {
                state.disengage();
                self.shared.avatar.clear_look_at_target();
                self.shared.avatar.remove_attention_target(id);
                tracing::info!(player = %id, "Stopped following player");
            } else {
                self.start_following(state, id);
            }
            return;
        }

        if let Some(previous) = state.bind(player) {
            self.release(previous.id());
        }
        self.start_following(state, id);
    }

    fn start_following(&self, state: &mut BehaviorState, player: PlayerId) {
        let epoch = state.engage();
        self.shared.avatar.add_attention_target(player);
        follow::spawn(self.shared.clone(), epoch);
        tracing::info!(%player, epoch, "Following player");
    }

    /// Hand-off cleanup for a player that lost the binding
    fn release(&self, player: PlayerId) {
        self.shared.avatar.clear_look_at_target();
        self.shared.avatar.remove_attention_target(player);
        tracing::debug!(%player, "Released previous player");
    }

    fn schedule_single_click(&self, state: &mut BehaviorState, player: PlayerRef) {
        let token = self.shared.shutdown.child_token();
        let click_id = state.schedule_click(player.id(), token.clone());
        let delay = self.shared.config.click_threshold();
        let behavior = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            behavior.resolve_single_click(click_id, token, player).await;
        });
    }

    async fn resolve_single_click(
        &self,
        click_id: u64,
        token: CancellationToken,
        player: PlayerRef,
    ) {
        let id = player.id();
        {
            let mut state = self.shared.state.lock().await;
            // A double click may have cancelled us after the window closed
            // but before we got the lock.
            if token.is_cancelled() {
                return;
            }
            state.pending_click_mut().complete(click_id);

            if state.is_following_player(id) {
                tracing::debug!(player = %id, "Already following player, ignoring single click");
                return;
            }
            if let Some(previous) = state.bind(&player) {
                self.release(previous.id());
            }
        }

        let shared = self.shared.clone();
        let outcome = self
            .shared
            .conversation
            .engage(id, move || async move {
                shared.state.lock().await.is_bound_to(id)
            })
            .await;

        match outcome {
            Ok(Engagement::Listening) => {
                tracing::info!(player = %id, "Started conversation with player")
            }
            Ok(Engagement::Superseded) => {}
            Err(e) => tracing::warn!(player = %id, "Conversation failed: {}", e),
        }
    }

    fn spawn_event_pump(&self, mut events: mpsc::UnboundedReceiver<TriggerEvent>) {
        let behavior = self.clone();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = behavior.shared.shutdown.cancelled() => break,
                    event = events.recv() => event,
                };
                match event {
                    Some(TriggerEvent::PlayerEntered(player)) => {
                        behavior.player_entered(player).await
                    }
                    None => {
                        tracing::debug!("Trigger event stream closed");
                        break;
                    }
                }
            }
        });
    }
}
