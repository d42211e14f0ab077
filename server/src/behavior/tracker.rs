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

//! Keeps the trigger volume glued to the NPC

use crate::host::{NpcAvatar, TriggerVolume};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Period of the trigger sync tick
pub const TRIGGER_SYNC_TICK: Duration = Duration::from_millis(100);

/// Copy the NPC transform onto the trigger volume
pub fn sync_trigger(body: &dyn NpcAvatar, trigger: &dyn TriggerVolume) {
    trigger.set_position(body.position());
    trigger.set_rotation(body.rotation());
}

pub(crate) fn spawn(
    body: Arc<dyn NpcAvatar>,
    trigger: Arc<dyn TriggerVolume>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval_at(Instant::now() + TRIGGER_SYNC_TICK, TRIGGER_SYNC_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if body.is_available() {
                sync_trigger(body.as_ref(), trigger.as_ref());
            }
        }
    });
}
