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

//! Scripted scenarios
//!
//! A scenario places the NPC and a handful of players, then clicks the NPC's
//! trigger on a timeline. [`Simulation::run`] steps the world in real (or
//! paused tokio) time while the behavior reacts.
//!
//! ```yaml
//! npc_start: [0.0, 0.0, 0.0]
//! npc_speed: 4.0
//! step_ms: 50
//! players:
//!   - name: alice
//!     start: [10.0, 0.0, 0.0]
//!     velocity: [0.0, 0.0, 1.0]
//! clicks:
//!   - { at_ms: 0, player: alice }
//!   - { at_ms: 200, player: alice }
//! ```

use super::adapters::{ConversationRecord, SimAvatar, SimConversation, SimNpc, SimPlayer, SimTrigger};
use super::world::SimWorld;
use crate::behavior::{BehaviorConfig, BehaviorError, BehaviorSnapshot, Collaborators, NpcBehavior};
use crate::host::Player;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tagalong_common::PlayerId;
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};

/// Errors raised while setting up or running a simulation
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Click references unknown player '{0}'")]
    UnknownPlayer(String),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),
}

pub type SimulationResult<T> = Result<T, SimulationError>;

/// A scripted player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScript {
    pub name: String,
    pub start: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    /// Remove the player from the world at this time
    #[serde(default)]
    pub leave_at_ms: Option<u64>,
}

/// A click on the NPC's trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickScript {
    pub at_ms: u64,
    pub player: String,
}

/// World layout and timeline for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub npc_start: Vec3,
    /// Walking speed of the NPC in metres per second
    pub npc_speed: f32,
    pub trigger_radius: f32,
    pub step_ms: u64,
    pub conversation_enabled: bool,
    /// Spawn the NPC without a drivable avatar
    pub npc_without_avatar: bool,
    pub players: Vec<PlayerScript>,
    pub clicks: Vec<ClickScript>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            npc_start: Vec3::ZERO,
            npc_speed: 4.0,
            trigger_radius: 1.0,
            step_ms: 50,
            conversation_enabled: true,
            npc_without_avatar: false,
            players: Vec::new(),
            clicks: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    pub fn with_player(mut self, name: &str, start: Vec3) -> Self {
        self.players.push(PlayerScript {
            name: name.to_string(),
            start,
            velocity: Vec3::ZERO,
            leave_at_ms: None,
        });
        self
    }

    pub fn with_click(mut self, at_ms: u64, player: &str) -> Self {
        self.clicks.push(ClickScript {
            at_ms,
            player: player.to_string(),
        });
        self
    }

    pub fn validate(&self) -> SimulationResult<()> {
        if self.step_ms == 0 {
            return Err(SimulationError::InvalidScenario(
                "step_ms must be positive".to_string(),
            ));
        }
        if !self.npc_speed.is_finite() || self.npc_speed < 0.0 {
            return Err(SimulationError::InvalidScenario(format!(
                "npc_speed must be a finite non-negative number, got {}",
                self.npc_speed
            )));
        }
        let mut names = Vec::with_capacity(self.players.len());
        for player in &self.players {
            if names.contains(&player.name.as_str()) {
                return Err(SimulationError::InvalidScenario(format!(
                    "Duplicate player name '{}'",
                    player.name
                )));
            }
            names.push(player.name.as_str());
        }
        for click in &self.clicks {
            if !names.contains(&click.player.as_str()) {
                return Err(SimulationError::UnknownPlayer(click.player.clone()));
            }
        }
        Ok(())
    }
}

/// Final state of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub snapshot: BehaviorSnapshot,
    pub npc_position: Vec3,
    pub trigger_position: Vec3,
    pub player_ids: HashMap<String, PlayerId>,
    /// Final positions of players still in the world
    pub player_positions: HashMap<String, Vec3>,
    pub conversations: Vec<ConversationRecord>,
}

enum Cue {
    Click(String),
    Leave(String),
}

/// One NPC, its trigger and the scripted players
pub struct Simulation {
    behavior: BehaviorConfig,
    scenario: ScenarioConfig,
}

impl Simulation {
    pub fn new(behavior: BehaviorConfig, scenario: ScenarioConfig) -> Self {
        Self { behavior, scenario }
    }

    /// Run the scenario for `duration` and report where everything ended up
    pub async fn run(self, duration: Duration) -> SimulationResult<SimulationReport> {
        self.scenario.validate()?;

        let world = SimWorld::new();
        let avatar = SimAvatar::spawn(&world, self.scenario.npc_start, self.scenario.npc_speed);
        let trigger = SimTrigger::spawn(&world, self.scenario.npc_start, self.scenario.trigger_radius);
        let conversation = SimConversation::new();
        let npc = SimNpc::new(
            (!self.scenario.npc_without_avatar).then(|| avatar.clone()),
            self.scenario.conversation_enabled,
        );

        let players: HashMap<String, Arc<SimPlayer>> = self
            .scenario
            .players
            .iter()
            .map(|script| {
                let player = SimPlayer::spawn(&world, script.start, script.velocity);
                tracing::debug!(name = %script.name, id = %player.id(), "Spawned player");
                (script.name.clone(), player)
            })
            .collect();

        let mut timeline = self.timeline();
        let behavior = NpcBehavior::start(
            self.behavior,
            Collaborators {
                npc: Arc::new(npc),
                trigger: Some(trigger.clone()),
                conversation: conversation.clone(),
            },
        )
        .await?;

        let step = Duration::from_millis(self.scenario.step_ms);
        let start = Instant::now();
        let mut ticker = tokio::time::interval(step);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let elapsed = start.elapsed();

            while let Some(entry) = timeline.first_entry() {
                if Duration::from_millis(*entry.key()) > elapsed {
                    break;
                }
                for cue in entry.remove() {
                    match cue {
                        Cue::Click(name) => {
                            if let Some(player) = players.get(&name) {
                                trigger.click(player.clone());
                            }
                        }
                        Cue::Leave(name) => {
                            if let Some(player) = players.get(&name) {
                                tracing::debug!(%name, "Player left");
                                player.leave();
                            }
                        }
                    }
                }
            }

            if elapsed >= duration {
                break;
            }
            world.step(step);
        }

        // Let the behavior drain clicks issued on the final step
        tokio::task::yield_now().await;
        let snapshot = behavior.snapshot().await;
        behavior.shutdown().await;

        Ok(SimulationReport {
            snapshot,
            npc_position: world.position(avatar.entity()).unwrap_or_default(),
            trigger_position: world.position(trigger.entity()).unwrap_or_default(),
            player_ids: players
                .iter()
                .map(|(name, player)| (name.clone(), player.id()))
                .collect(),
            player_positions: players
                .iter()
                .filter_map(|(name, player)| {
                    world.position(player.entity()).map(|p| (name.clone(), p))
                })
                .collect(),
            conversations: conversation.records(),
        })
    }

    fn timeline(&self) -> BTreeMap<u64, Vec<Cue>> {
        let mut timeline: BTreeMap<u64, Vec<Cue>> = BTreeMap::new();
        for click in &self.scenario.clicks {
            timeline
                .entry(click.at_ms)
                .or_default()
                .push(Cue::Click(click.player.clone()));
        }
        for player in &self.scenario.players {
            if let Some(at_ms) = player.leave_at_ms {
                timeline
                    .entry(at_ms)
                    .or_default()
                    .push(Cue::Leave(player.name.clone()));
            }
        }
        timeline
    }
}
