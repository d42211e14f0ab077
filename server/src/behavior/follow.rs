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

//! Follow motion: standoff tracking of the bound player
//!
//! Each engagement runs its own tick loop. The loop owns no state of its own;
//! every tick it asks the shared state whether its engagement is still the
//! current one and stops itself as soon as it is not.

use super::controller::Shared;
use super::error::ignore_rejection;
use crate::host::NpcAvatar;
use glam::Vec3;
use std::sync::Arc;
use std::time::Duration;
use tagalong_common::geometry::planar_offset;
use tokio::time::{Instant, MissedTickBehavior};

/// Period of the follow tick
pub const FOLLOW_TICK: Duration = Duration::from_millis(200);

/// Commands to issue for one follow tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowPlan {
    /// Standoff point to walk to, `None` when already inside personal space
    pub move_to: Option<Vec3>,
    /// Horizontal direction to face, `None` when standing on the player
    pub face: Option<Vec3>,
    /// Where to point head and eyes
    pub look_at: Option<Vec3>,
}

/// Plan one follow tick for an NPC at `npc` tracking a player at `player`.
pub fn plan_follow(npc: Vec3, player: Vec3, personal_space: f32) -> FollowPlan {
    let offset = planar_offset(npc, player);
    let distance = offset.length();

    let move_to = (distance > personal_space).then(|| {
        let direction = offset / distance;
        Vec3::new(
            player.x - direction.x * personal_space,
            npc.y,
            player.z - direction.y * personal_space,
        )
    });

    if distance > 0.0 {
        FollowPlan {
            move_to,
            face: Some(Vec3::new(offset.x, 0.0, offset.y)),
            look_at: Some(player),
        }
    } else {
        FollowPlan {
            move_to,
            face: None,
            look_at: None,
        }
    }
}

/// Issue the commands of `plan`. Failures are dropped; the next tick re-plans.
pub fn apply_plan(avatar: &dyn NpcAvatar, plan: &FollowPlan) {
    if let Some(target) = plan.move_to {
        ignore_rejection("move_to_position", avatar.move_to_position(target));
    }
    if let Some(direction) = plan.face {
        ignore_rejection("rotate_to", avatar.rotate_to(direction));
    }
    if let Some(position) = plan.look_at {
        ignore_rejection("set_look_at_target", avatar.set_look_at_target(position));
    }
}

/// Spawn the tick loop for engagement `epoch`
pub(crate) fn spawn(shared: Arc<Shared>, epoch: u64) {
    tokio::spawn(async move {
        run(shared, epoch).await;
    });
}

async fn run(shared: Arc<Shared>, epoch: u64) {
    let mut ticker = tokio::time::interval_at(Instant::now() + FOLLOW_TICK, FOLLOW_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(epoch, "Follow engagement started");
    loop {
        tokio::select! {
            biased;
            _ = shared.shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if !shared.avatar.is_available() {
            tracing::debug!(epoch, "NPC avatar unavailable, ending follow");
            break;
        }

        let player = {
            let state = shared.state.lock().await;
            state.follow_target(epoch)
        };
        let Some(player) = player else {
            tracing::debug!(epoch, "Follow engagement over");
            break;
        };
        let Some(player_position) = player.position() else {
            tracing::debug!(epoch, player = %player.id(), "Followed player is gone");
            break;
        };

        let plan = plan_follow(
            shared.avatar.position(),
            player_position,
            shared.config.personal_space,
        );
        apply_plan(shared.avatar.as_ref(), &plan);
    }
}
