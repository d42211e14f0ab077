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

//! In-process simulation host
//!
//! A small hecs world that implements every host trait, so the behavior can
//! be run from the command line or in integration tests without an engine.

pub mod adapters;
pub mod components;
pub mod scenario;
pub mod world;

pub use adapters::{ConversationRecord, SimAvatar, SimConversation, SimNpc, SimPlayer, SimTrigger};
pub use scenario::{
    ClickScript, PlayerScript, ScenarioConfig, Simulation, SimulationError, SimulationReport,
    SimulationResult,
};
pub use world::SimWorld;
