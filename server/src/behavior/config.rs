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

//! Per-NPC behavior configuration

use super::error::{BehaviorError, BehaviorResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables fixed when the behavior starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Distance at which following would begin.
    ///
    /// Carried for host tooling only; follow motion is driven by the trigger
    /// volume and never reads it.
    pub follow_distance: f32,
    /// Standoff radius kept from a followed player
    pub personal_space: f32,
    /// Maximum wander distance from home
    pub wander_radius: f32,
    /// Time between wander attempts
    pub wander_interval_ms: u64,
    /// Double-click window
    pub click_threshold_ms: u64,
    /// Emit wander diagnostics
    pub debug_mode: bool,
}

impl BehaviorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            follow_distance: 5.0,
            personal_space: 2.0,
            wander_radius: 5.0,
            wander_interval_ms: 5000,
            click_threshold_ms: 400,
            debug_mode: false,
        }
    }

    pub fn with_personal_space(mut self, personal_space: f32) -> Self {
        self.personal_space = personal_space;
        self
    }

    pub fn with_wander_radius(mut self, wander_radius: f32) -> Self {
        self.wander_radius = wander_radius;
        self
    }

    pub fn with_wander_interval_ms(mut self, wander_interval_ms: u64) -> Self {
        self.wander_interval_ms = wander_interval_ms;
        self
    }

    pub fn with_click_threshold_ms(mut self, click_threshold_ms: u64) -> Self {
        self.click_threshold_ms = click_threshold_ms;
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Double-click window as a duration
    pub fn click_threshold(&self) -> Duration {
        Duration::from_millis(self.click_threshold_ms)
    }

    /// Wander period as a duration
    pub fn wander_interval(&self) -> Duration {
        Duration::from_millis(self.wander_interval_ms)
    }

    /// Check that every value is usable by the tick loops
    pub fn validate(&self) -> BehaviorResult<()> {
        let distances = [
            ("follow_distance", self.follow_distance),
            ("personal_space", self.personal_space),
            ("wander_radius", self.wander_radius),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(BehaviorError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        // tokio intervals panic on a zero period.
        if self.wander_interval_ms == 0 {
            return Err(BehaviorError::InvalidConfig(
                "wander_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_config_defaults() {
        let config = BehaviorConfig::default();
        assert_eq!(config.follow_distance, 5.0);
        assert_eq!(config.personal_space, 2.0);
        assert_eq!(config.wander_radius, 5.0);
        assert_eq!(config.wander_interval(), Duration::from_secs(5));
        assert_eq!(config.click_threshold(), Duration::from_millis(400));
        assert!(!config.debug_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_behavior_config_partial_yaml_uses_defaults() {
        let config: BehaviorConfig =
            serde_yaml::from_str("personal_space: 3.5\ndebug_mode: true\n").unwrap();
        assert_eq!(config.personal_space, 3.5);
        assert!(config.debug_mode);
        assert_eq!(config.click_threshold_ms, 400);
        assert_eq!(config.wander_interval_ms, 5000);
    }

    #[test]
    fn test_behavior_config_rejects_zero_wander_interval() {
        let config = BehaviorConfig::default().with_wander_interval_ms(0);
        assert!(matches!(
            config.validate(),
            Err(BehaviorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_behavior_config_rejects_bad_distances() {
        assert!(BehaviorConfig::default()
            .with_personal_space(-1.0)
            .validate()
            .is_err());
        assert!(BehaviorConfig::default()
            .with_wander_radius(f32::NAN)
            .validate()
            .is_err());
        assert!(BehaviorConfig::default()
            .with_wander_radius(0.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_behavior_config_allows_zero_threshold() {
        let config = BehaviorConfig::default().with_click_threshold_ms(0);
        assert!(config.validate().is_ok());
        assert_eq!(config.click_threshold(), Duration::ZERO);
    }
}
