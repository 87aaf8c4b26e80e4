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
//! # Celestial Physics
//!
//! A deterministic N-body gravity simulation for planetary systems, with
//! tree-accelerated force evaluation and a choice of numerical integrators.
//!
//! ## Features
//!
//! - **Gravity**: direct O(n²) summation or a Barnes–Hut octree with a
//!   configurable opening angle, both with Plummer softening
//! - **Integrators**: velocity Verlet (symplectic, default), RK4, adaptive
//!   RK45 and a fixed-node Gauss–Radau scheme for close encounters
//! - **Fixed timestep**: wall-clock time is accumulated and drained in whole
//!   steps, so results do not depend on frame rate
//! - **Events**: collision detection and sphere-of-influence transitions
//! - **Replication**: per-body history with interpolation, plus a compact
//!   binary snapshot format
//! - **Parallelization**: optional Rayon integration for the O(n²) scans
//!
//! ## Example
//!
//! ```rust
//! use celestial_physics::{BodyDefinition, EngineConfig, PhysicsEngine, Vector3};
//!
//! let mut engine = PhysicsEngine::new(EngineConfig::default().with_timestep(60.0))?;
//! let sun = BodyDefinition::massive("sun", 1.989e30, 6.96e8, Vector3::zero());
//! let earth = BodyDefinition::orbiting("earth", 5.972e24, 6.371e6, &sun, 1.496e11);
//! engine.add_body(sun)?;
//! engine.add_body(earth)?;
//!
//! for _ in 0..100 {
//!     engine.step(60.0)?;
//! }
//! let distance = engine.body("earth").map(|b| b.position.length());
//! assert!(distance.is_some_and(|d| (d - 1.496e11).abs() < 1.0e8));
//! # Ok::<(), celestial_physics::PhysicsError>(())
//! ```

#![warn(missing_docs)]

/// Celestial bodies and their snapshot history
pub mod body;

/// Simulation engine, configuration, events and world files
pub mod engine;

/// Error types
pub mod error;

/// Gravitational force evaluation
pub mod gravity;

/// Numerical integration methods
pub mod integration;

/// Vector and quaternion math
pub mod math;

/// State replication records and wire format
pub mod network;

/// Orbital mechanics helpers and reference constants
pub mod orbital;

pub use body::{Body, BodyDefinition, BodyId, BodyKind};
pub use engine::{
    CollisionEvent, EngineConfig, PhysicsEngine, SimulationState, SoiTransitionEvent, WorldState,
};
pub use error::{PhysicsError, Result};
pub use gravity::GravityMethod;
pub use integration::{Integrator, IntegratorKind};
pub use math::{Quaternion, Vector3};
pub use network::BodyNetworkState;
