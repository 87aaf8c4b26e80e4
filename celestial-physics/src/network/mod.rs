// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! State replication records
//!
//! The authoritative simulation exports one [`BodyNetworkState`] per body;
//! followers import them and interpolate between the resulting history
//! snapshots. Records are plain serde data, and [`wire`] packs them into a
//! compact fixed-width binary frame.

pub mod wire;

pub use wire::{
    build_id_hash_map, decode, encode, hash_id, WireError, WireSnapshot, BODY_RECORD_SIZE, HEADER_SIZE,
};

use crate::body::BodyId;
use serde::{Deserialize, Serialize};

/// Kinematic state of one body at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyNetworkState {
    /// Body id
    pub id: BodyId,
    /// Position in m
    pub position: [f64; 3],
    /// Velocity in m/s
    pub velocity: [f64; 3],
    /// Orientation quaternion `[x, y, z, w]`
    pub orientation: [f64; 4],
    /// Spin rate in rad/s
    pub angular_velocity: f64,
    /// Simulation time the state belongs to
    pub timestamp: f64,
}
