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

//! Behavior error types

use thiserror::Error;

/// Errors that prevent a behavior from starting.
///
/// Every variant is fatal: the behavior logs it and never enters a mode or
/// schedules a tick.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BehaviorError {
    /// No trigger volume was configured for the NPC.
    #[error("No trigger set")]
    MissingTrigger,

    /// The host has conversation support disabled for this NPC.
    #[error("Conversation not enabled")]
    ConversationDisabled,

    /// The NPC entity has no drivable avatar.
    #[error("NPC does not have an avatar")]
    MissingAvatar,

    /// The behavior configuration is out of range.
    #[error("Invalid behavior configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for behavior startup.
pub type BehaviorResult<T> = Result<T, BehaviorError>;

/// A movement, orientation or look-at command the host refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The host rejected the command (unreachable target, bad direction, ...).
    #[error("Command rejected: {0}")]
    Rejected(String),

    /// The NPC body is not currently drivable.
    #[error("NPC avatar unavailable")]
    Unavailable,
}

/// Result of a single locomotion or attention command.
pub type CommandResult = Result<(), CommandError>;

/// Failures reported by the dialogue engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversationError {
    /// The player could not be added as a participant.
    #[error("Participant registration failed: {0}")]
    Registration(String),

    /// Listening to the player could not be started.
    #[error("Start listening failed: {0}")]
    Listening(String),
}

/// Run a best-effort command and drop its failure.
///
/// Motion is re-planned on the next tick, so a refused command needs neither a
/// retry nor an error path. The refusal is still logged and counted.
pub(crate) fn ignore_rejection(command: &'static str, result: CommandResult) {
    if let Err(e) = result {
        tracing::debug!(command, error = %e, "Ignoring rejected command");
        metrics::counter!("behavior.commands.rejected", "command" => command).increment(1);
    }
}
