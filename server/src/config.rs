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

use crate::behavior::BehaviorConfig;
use crate::sim::ScenarioConfig;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "server/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "server/.env"
    )]
    pub env_file: Option<String>,

    #[arg(
        short = 'd',
        long = "duration-ms",
        help = "How long to run the simulation, in milliseconds",
        default_value_t = 10_000
    )]
    pub duration_ms: u64,
}

impl Arguments {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
            duration_ms: 10_000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Name used in log output; may be taken from the environment
    #[serde(default)]
    pub name: EnvField<String>,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, ConfigError> {
        let conf = serde_yaml::from_reader(std::fs::File::open(path)?)?;
        Ok(conf)
    }

    /// Configured name, or "tagalong" when unset
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "tagalong"
        } else {
            self.name.as_str()
        }
    }
}
