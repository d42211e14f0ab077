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

//! Idle wandering around the home position

use super::controller::Shared;
use super::error::ignore_rejection;
use crate::host::NpcAvatar;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;
use std::sync::Arc;
use tagalong_common::geometry::ring_point;
use tokio::time::{Instant, MissedTickBehavior};

/// Pick a random point within `radius` of `home` on the ground plane
pub fn pick_wander_target<R: Rng + ?Sized>(home: Vec3, radius: f32, rng: &mut R) -> Vec3 {
    let angle = rng.random_range(0.0..TAU);
    let distance = rng.random_range(0.0..=radius);
    ring_point(home, angle, distance)
}

/// Walk once toward a random point near home
pub fn wander_once<R: Rng + ?Sized>(
    avatar: &dyn NpcAvatar,
    home: Vec3,
    radius: f32,
    debug_mode: bool,
    rng: &mut R,
) -> Vec3 {
    let target = pick_wander_target(home, radius, rng);
    ignore_rejection("move_to_position", avatar.move_to_position(target));
    if debug_mode {
        tracing::info!("NPC wandering to {:.2}, {:.2}", target.x, target.z);
    }
    target
}

pub(crate) fn spawn(shared: Arc<Shared>) {
    tokio::spawn(async move {
        run(shared).await;
    });
}

async fn run(shared: Arc<Shared>) {
    let period = shared.config.wander_interval();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shared.shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let home = {
            let state = shared.state.lock().await;
            if !state.should_wander() {
                continue;
            }
            state.home()
        };
        if !shared.avatar.is_available() {
            continue;
        }

        wander_once(
            shared.avatar.as_ref(),
            home,
            shared.config.wander_radius,
            shared.config.debug_mode,
            &mut rand::rng(),
        );
    }
    tracing::debug!("Wander loop stopped");
}
