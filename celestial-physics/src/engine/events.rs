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
//! Events emitted by the engine during a tick

use crate::body::BodyId;
use crate::math::Vector3;
use serde::{Deserialize, Serialize};

/// Two bodies overlap (detection only, no response is applied)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// First body of the pair
    pub body_a: BodyId,
    /// Second body of the pair
    pub body_b: BodyId,
    /// Point on the surface of `body_a` facing `body_b`
    pub point: Vector3,
    /// Velocity of `body_b` relative to `body_a`
    pub relative_velocity: Vector3,
    /// Simulation time at the start of the tick that found the overlap
    pub timestamp: f64,
}

/// A passive body's dominant gravitational parent changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoiTransitionEvent {
    /// Body that moved
    pub body: BodyId,
    /// Previous dominant body
    pub from: Option<BodyId>,
    /// New dominant body
    pub to: Option<BodyId>,
    /// Simulation time at the start of the tick that found the change
    pub timestamp: f64,
}

/// Summary passed to the tick callback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Simulation time in s
    pub time: f64,
    /// Ticks completed
    pub tick: u64,
    /// Registered bodies
    pub body_count: usize,
    /// Massive bodies
    pub massive_bodies: usize,
    /// Passive bodies
    pub passive_bodies: usize,
    /// Kinetic energy in J
    pub kinetic_energy: f64,
    /// Potential energy in J
    pub potential_energy: f64,
    /// Kinetic plus potential energy in J
    pub total_energy: f64,
}
