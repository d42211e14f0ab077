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

//! Single/double click classification for trigger activations

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Kind of a raw trigger activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

impl ClickKind {
    /// Metric and log label
    pub fn label(&self) -> &'static str {
        match self {
            ClickKind::Single => "single",
            ClickKind::Double => "double",
        }
    }
}

impl fmt::Display for ClickKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a click at `now` against the previous click.
///
/// `previous` must be the timestamp recorded *before* this click; `None`
/// means no click has happened yet. The window is inclusive: a click exactly
/// `threshold` after the previous one is a double click.
pub fn classify(now: Instant, previous: Option<Instant>, threshold: Duration) -> ClickKind {
    match previous {
        Some(last) if now.saturating_duration_since(last) <= threshold => ClickKind::Double,
        _ => ClickKind::Single,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: Duration = Duration::from_millis(400);

    #[test]
    fn test_first_click_is_single() {
        let now = Instant::now();
        assert_eq!(classify(now, None, THRESHOLD), ClickKind::Single);
    }

    #[test]
    fn test_click_within_window_is_double() {
        let first = Instant::now();
        let second = first + Duration::from_millis(200);
        assert_eq!(classify(second, Some(first), THRESHOLD), ClickKind::Double);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let first = Instant::now();
        assert_eq!(
            classify(first + THRESHOLD, Some(first), THRESHOLD),
            ClickKind::Double
        );
        assert_eq!(
            classify(
                first + THRESHOLD + Duration::from_millis(1),
                Some(first),
                THRESHOLD
            ),
            ClickKind::Single
        );
    }

    #[test]
    fn test_zero_threshold_only_matches_same_instant() {
        let first = Instant::now();
        assert_eq!(classify(first, Some(first), Duration::ZERO), ClickKind::Double);
        assert_eq!(
            classify(first + Duration::from_millis(1), Some(first), Duration::ZERO),
            ClickKind::Single
        );
    }

    #[test]
    fn test_click_kind_labels() {
        assert_eq!(ClickKind::Single.to_string(), "single");
        assert_eq!(ClickKind::Double.label(), "double");
    }
}
