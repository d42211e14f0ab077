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

//! NPC follow-and-converse behavior
//!
//! One [`NpcBehavior`] per NPC. Players single-click the NPC's trigger volume
//! to talk to it and double-click to make it follow them; while nobody has
//! claimed it the NPC wanders around the spot it started at.

pub mod click;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod follow;
pub mod state;
pub mod tracker;
pub mod wander;

#[cfg(test)]
pub mod test_utils;

pub use click::{ClickKind, classify};
pub use config::BehaviorConfig;
pub use controller::{Collaborators, NpcBehavior};
pub use conversation::{ConversationBridge, Engagement};
pub use error::{BehaviorError, BehaviorResult, CommandError, CommandResult, ConversationError};
pub use follow::{FOLLOW_TICK, FollowPlan, plan_follow};
pub use state::{BehaviorMode, BehaviorSnapshot, BehaviorState};
pub use tracker::TRIGGER_SYNC_TICK;
pub use wander::pick_wander_target;
