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

use clap::Parser;
use tagalong_server::config::{Arguments, Configuration};
use tagalong_server::sim::{ConversationRecord, Simulation};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration from a file with environment variable substitution
    let config = match Configuration::load(&arguments.config_file) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Unable to load configuration file {}: {}", arguments.config_file, e);
            return Err(e.into());
        }
    };

    tracing::debug!("Configuration loaded: {:?}", config);
    tracing::info!(
        "Starting {} simulation for {} ms...",
        config.display_name(),
        arguments.duration_ms
    );

    let simulation = Simulation::new(config.behavior.clone(), config.scenario.clone());
    let report = tokio::select! {
        result = simulation.run(arguments.duration()) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping simulation");
            return Ok(());
        }
    };

    let snapshot = &report.snapshot;
    tracing::info!(
        "Final mode {} (engagement {}), active player {}",
        snapshot.mode,
        snapshot.engagement,
        snapshot
            .active_player
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    tracing::info!(
        "NPC ended at ({:.2}, {:.2}, {:.2}), home ({:.2}, {:.2}, {:.2})",
        report.npc_position.x,
        report.npc_position.y,
        report.npc_position.z,
        snapshot.home.x,
        snapshot.home.y,
        snapshot.home.z
    );
    for (name, position) in &report.player_positions {
        tracing::info!(
            "Player {} ended at ({:.2}, {:.2}, {:.2})",
            name,
            position.x,
            position.y,
            position.z
        );
    }
    let conversations = report
        .conversations
        .iter()
        .filter(|record| matches!(record, ConversationRecord::Listening(..)))
        .count();
    tracing::info!("{} conversation(s) started", conversations);

    Ok(())
}
