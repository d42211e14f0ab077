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

//! Tagalong NPC behavior runtime
//!
//! - [`behavior`]: the follow-and-converse state machine and its tick loops
//! - [`host`]: traits the hosting engine implements
//! - [`sim`]: an in-process hecs world implementing those traits
//! - [`config`]: command line and file configuration for the binary

pub mod behavior;
pub mod config;
pub mod host;
pub mod sim;
