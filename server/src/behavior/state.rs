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

//! Mutable per-NPC session state
//!
//! One [`BehaviorState`] exists per running behavior. It is only ever touched
//! through the controller's lock and never copied across an await, so every
//! handler and tick sees the latest binding.

use crate::host::{Player, PlayerRef};
use glam::Vec3;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Weak};
use tagalong_common::PlayerId;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Coarse behavior mode derived from the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BehaviorMode {
    /// No bound player; the NPC wanders around home
    Idle,
    /// A player is bound (conversation or paused follow) but not followed
    Bound,
    /// Actively following the bound player
    Following,
}

impl fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorMode::Idle => write!(f, "idle"),
            BehaviorMode::Bound => write!(f, "bound"),
            BehaviorMode::Following => write!(f, "following"),
        }
    }
}

/// Weak binding to the player holding the NPC's attention
#[derive(Clone)]
pub(crate) struct BoundPlayer {
    id: PlayerId,
    handle: Weak<dyn Player>,
}

impl BoundPlayer {
    fn new(player: &PlayerRef) -> Self {
        Self {
            id: player.id(),
            handle: Arc::downgrade(player),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Upgrade to a live handle, `None` once the host dropped the player
    pub fn upgrade(&self) -> Option<PlayerRef> {
        self.handle.upgrade()
    }
}

impl fmt::Debug for BoundPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundPlayer").field("id", &self.id).finish()
    }
}

/// A deferred single-click resolution waiting for its window to close
#[derive(Debug)]
pub(crate) struct ScheduledClick {
    id: u64,
    player: PlayerId,
    token: CancellationToken,
}

/// Outstanding single-click timer, if any
#[derive(Debug, Default)]
pub(crate) enum PendingClick {
    #[default]
    Idle,
    Scheduled(ScheduledClick),
}

impl PendingClick {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, PendingClick::Scheduled(_))
    }

    /// Player whose click is waiting, if any
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            PendingClick::Scheduled(click) => Some(click.player),
            PendingClick::Idle => None,
        }
    }

    /// Cancel the outstanding timer. Returns whether one was outstanding;
    /// calling it again is a no-op.
    pub fn cancel(&mut self) -> bool {
        match std::mem::take(self) {
            PendingClick::Scheduled(click) => {
                click.token.cancel();
                true
            }
            PendingClick::Idle => false,
        }
    }

    /// Clear the slot if `id` is still the outstanding timer
    pub fn complete(&mut self, id: u64) -> bool {
        match self {
            PendingClick::Scheduled(click) if click.id == id => {
                *self = PendingClick::Idle;
                true
            }
            _ => false,
        }
    }
}

/// Point-in-time copy of the session state for hosts and tests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorSnapshot {
    pub mode: BehaviorMode,
    pub active_player: Option<PlayerId>,
    pub following: bool,
    pub home: Vec3,
    pub click_pending: bool,
    pub engagement: u64,
}

/// Session state owned by one behavior controller
#[derive(Debug)]
pub struct BehaviorState {
    home: Vec3,
    active_player: Option<BoundPlayer>,
    following: bool,
    last_click: Option<Instant>,
    pending_click: PendingClick,
    engagement: u64,
    next_click_id: u64,
}

impl BehaviorState {
    /// Create the state for an NPC standing at `home`
    pub fn new(home: Vec3) -> Self {
        Self {
            home,
            active_player: None,
            following: false,
            last_click: None,
            pending_click: PendingClick::Idle,
            engagement: 0,
            next_click_id: 0,
        }
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn mode(&self) -> BehaviorMode {
        match (&self.active_player, self.following) {
            (None, _) => BehaviorMode::Idle,
            (Some(_), false) => BehaviorMode::Bound,
            (Some(_), true) => BehaviorMode::Following,
        }
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    pub fn active_player_id(&self) -> Option<PlayerId> {
        self.active_player.as_ref().map(BoundPlayer::id)
    }

    pub fn is_bound_to(&self, player: PlayerId) -> bool {
        self.active_player_id() == Some(player)
    }

    /// Actively following exactly this player
    pub fn is_following_player(&self, player: PlayerId) -> bool {
        self.following && self.is_bound_to(player)
    }

    /// Wandering is only allowed with no binding at all
    pub fn should_wander(&self) -> bool {
        !self.following && self.active_player.is_none()
    }

    /// Record a raw click and return the previous click time
    pub fn record_click(&mut self, now: Instant) -> Option<Instant> {
        self.last_click.replace(now)
    }

    pub fn last_click(&self) -> Option<Instant> {
        self.last_click
    }

    /// Bind `player`, returning the previously bound player if it differs.
    ///
    /// `following` and the engagement epoch are left alone: a running follow
    /// loop retargets the new player on its next tick.
    pub(crate) fn bind(&mut self, player: &PlayerRef) -> Option<BoundPlayer> {
        let incoming = player.id();
        if self.is_bound_to(incoming) {
            return None;
        }
        self.active_player.replace(BoundPlayer::new(player))
    }

    /// Start a new engagement with the bound player and return its epoch
    pub(crate) fn engage(&mut self) -> u64 {
        debug_assert!(self.active_player.is_some(), "engage without a bound player");
        self.following = true;
        self.engagement += 1;
        self.engagement
    }

    /// Stop following; running follow tasks observe a new epoch and stop
    pub(crate) fn disengage(&mut self) {
        self.following = false;
        self.engagement += 1;
    }

    pub fn engagement(&self) -> u64 {
        self.engagement
    }

    /// Player to track for the engagement `epoch`, or `None` if that
    /// engagement is over or superseded or the player is gone.
    pub(crate) fn follow_target(&self, epoch: u64) -> Option<PlayerRef> {
        if !self.following || self.engagement != epoch {
            return None;
        }
        self.active_player.as_ref()?.upgrade()
    }

    pub(crate) fn pending_click(&self) -> &PendingClick {
        &self.pending_click
    }

    pub(crate) fn pending_click_mut(&mut self) -> &mut PendingClick {
        &mut self.pending_click
    }

    /// Replace any outstanding single-click timer with a new one and return
    /// the new timer's id. The old timer is cancelled first.
    pub(crate) fn schedule_click(&mut self, player: PlayerId, token: CancellationToken) -> u64 {
        self.pending_click.cancel();
        self.next_click_id += 1;
        self.pending_click = PendingClick::Scheduled(ScheduledClick {
            id: self.next_click_id,
            player,
            token,
        });
        self.next_click_id
    }

    pub fn snapshot(&self) -> BehaviorSnapshot {
        BehaviorSnapshot {
            mode: self.mode(),
            active_player: self.active_player_id(),
            following: self.following,
            home: self.home,
            click_pending: self.pending_click.is_scheduled(),
            engagement: self.engagement,
        }
    }
}
