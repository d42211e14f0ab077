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

//! Bridge from a resolved single click to the dialogue engine

use super::error::ConversationError;
use crate::host::{ConversationProvider, ListenMode, NpcAvatar};
use std::future::Future;
use std::sync::Arc;
use tagalong_common::PlayerId;

/// Outcome of an engage attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    /// The player is registered and being listened to
    Listening,
    /// The binding changed while registering; listening was not started
    Superseded,
}

/// Hands a player over to the dialogue engine
#[derive(Clone)]
pub struct ConversationBridge {
    provider: Arc<dyn ConversationProvider>,
    avatar: Arc<dyn NpcAvatar>,
}

impl ConversationBridge {
    pub fn new(provider: Arc<dyn ConversationProvider>, avatar: Arc<dyn NpcAvatar>) -> Self {
        Self { provider, avatar }
    }

    /// Register `player` as a participant and start automatic listening.
    ///
    /// `still_bound` is consulted after registration completes; other clicks
    /// and ticks may run while registration is in flight, and listening is
    /// only started if the player is still the NPC's bound player.
    pub async fn engage<F, Fut>(
        &self,
        player: PlayerId,
        still_bound: F,
    ) -> Result<Engagement, ConversationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        self.avatar.add_attention_target(player);
        self.provider.register_participant(player).await?;

        if !still_bound().await {
            tracing::debug!(%player, "Binding changed during registration, not listening");
            return Ok(Engagement::Superseded);
        }

        self.provider
            .start_listening_to(player, ListenMode::Automatic)
            .await?;
        metrics::counter!("behavior.conversations").increment(1);
        tracing::debug!(%player, "Listening to player");
        Ok(Engagement::Listening)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::test_utils::RecordingAvatar;
    use crate::host::MockConversationProvider;
    use glam::Vec3;
    use mockall::Sequence;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_engage_registers_then_listens() {
        let player = PlayerId::new_v4();
        let mut provider = MockConversationProvider::new();
        let mut seq = Sequence::new();
        provider
            .expect_register_participant()
            .with(eq(player))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        provider
            .expect_start_listening_to()
            .with(eq(player), eq(ListenMode::Automatic))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let avatar = RecordingAvatar::at(Vec3::ZERO);
        let bridge = ConversationBridge::new(Arc::new(provider), avatar.clone());

        let outcome = bridge.engage(player, || async { true }).await;
        assert_eq!(outcome, Ok(Engagement::Listening));
        assert_eq!(avatar.log().attention_added, vec![player]);
    }

    #[tokio::test]
    async fn test_engage_stops_when_superseded() {
        let player = PlayerId::new_v4();
        let mut provider = MockConversationProvider::new();
        provider
            .expect_register_participant()
            .times(1)
            .returning(|_| Ok(()));
        provider.expect_start_listening_to().times(0);

        let bridge = ConversationBridge::new(Arc::new(provider), RecordingAvatar::at(Vec3::ZERO));

        let outcome = bridge.engage(player, || async { false }).await;
        assert_eq!(outcome, Ok(Engagement::Superseded));
    }

    #[tokio::test]
    async fn test_engage_propagates_registration_failure() {
        let player = PlayerId::new_v4();
        let mut provider = MockConversationProvider::new();
        provider
            .expect_register_participant()
            .times(1)
            .returning(|_| Err(ConversationError::Registration("full".into())));
        provider.expect_start_listening_to().times(0);

        let bridge = ConversationBridge::new(Arc::new(provider), RecordingAvatar::at(Vec3::ZERO));

        let outcome = bridge.engage(player, || async { true }).await;
        tokio_test::assert_err!(outcome);
    }
}
