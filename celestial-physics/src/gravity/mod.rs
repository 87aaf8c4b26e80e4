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
//! Newtonian gravity with Plummer softening
//!
//! # Physics Background
//!
//! Each massive body contributes an acceleration toward itself:
//!
//! **a = G · m / (r² + ε²)** along the unit separation vector
//!
//! Where:
//! - G is the gravitational constant (6.67430 × 10⁻¹¹ m³/(kg⋅s²))
//! - m is the mass of the source body
//! - r is the separation between the query point and the source
//! - ε is the softening length of the source
//!
//! Softening bounds the acceleration near r → 0. It does not remove the
//! singularity at exactly r = 0: a separation below 1e-10 m is reported as
//! [`PhysicsError::Singularity`] instead of producing NaN.
//!
//! # Methods
//!
//! - [`GravityMethod::Direct`]: exact O(n²) summation over every source.
//! - [`GravityMethod::BarnesHut`]: O(n log n) approximation through an
//!   [`Octree`] rebuilt each tick. Distant groups of bodies are replaced by a
//!   single point mass at their center of mass when the node's size-to-distance
//!   ratio falls below the opening angle θ.
//!
//! # Snapshot semantics
//!
//! Both methods read a slice of [`MassSource`] values captured at the start of
//! a tick. Integrating one body never changes the field felt by the next.
//!
//! # References
//!
//! - Barnes, J., & Hut, P. (1986). A hierarchical O(N log N) force-calculation
//!   algorithm. Nature, 324(6096), 446-449.
//! - Dehnen, W. (2001). "Towards optimal softening in three-dimensional N-body codes"
//! - [CODATA 2018 value for G](https://physics.nist.gov/cgi-bin/cuu/Value?bg)

use crate::body::Body;
use crate::error::{PhysicsError, Result};
use crate::math::Vector3;
use serde::{Deserialize, Serialize};

mod direct;
mod octree;

pub use direct::direct_acceleration;
pub use octree::{Octree, TreeStats};

/// Standard gravitational constant in SI units (m³/(kg⋅s²))
///
/// CODATA 2018 recommended value: 6.67430(15) × 10⁻¹¹ m³/(kg⋅s²)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// Softening length used when a body does not specify one (meters)
pub const DEFAULT_SOFTENING: f64 = 1e3; // 1 km

/// Separations below this are treated as coincident (meters)
pub const SINGULARITY_DISTANCE: f64 = 1e-10;

/// Default Barnes–Hut opening angle
pub const DEFAULT_THETA: f64 = 0.5;

/// Force evaluation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GravityMethod {
    /// Exact pairwise summation
    Direct,
    /// Octree approximation
    #[default]
    BarnesHut,
    /// Reserved; rejected by configuration validation
    FastMultipole,
}

/// Tick-start snapshot of one massive body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassSource {
    /// Registry index of the body
    pub body: usize,
    /// Position in m
    pub position: Vector3,
    /// Mass in kg
    pub mass: f64,
    /// Softening length in m
    pub softening: f64,
    /// Radius in m
    pub radius: f64,
}

impl MassSource {
    /// Capture the gravitational state of `body` at registry index `index`
    pub fn from_body(index: usize, body: &Body) -> Self {
        MassSource {
            body: index,
            position: body.position,
            mass: body.mass(),
            softening: body.softening(),
            radius: body.radius(),
        }
    }
}

/// Softened point-mass acceleration at `position` toward `center`
#[inline]
pub(crate) fn point_mass_acceleration(
    position: Vector3,
    center: Vector3,
    mass: f64,
    softening: f64,
) -> Result<Vector3> {
    let delta = center - position;
    let distance = delta.length();
    if distance < SINGULARITY_DISTANCE {
        return Err(PhysicsError::Singularity { position, distance });
    }
    let magnitude = GRAVITATIONAL_CONSTANT * mass / (distance * distance + softening * softening);
    Ok(delta * (magnitude / distance))
}

/// Read-only view used to evaluate accelerations during one tick
#[derive(Debug, Clone, Copy)]
pub struct GravityField<'a> {
    method: GravityMethod,
    theta: f64,
    tree: &'a Octree,
    sources: &'a [MassSource],
}

impl<'a> GravityField<'a> {
    /// Bundle a method with the snapshot (and tree, if built) it reads
    pub fn new(method: GravityMethod, theta: f64, tree: &'a Octree, sources: &'a [MassSource]) -> Self {
        GravityField {
            method,
            theta,
            tree,
            sources,
        }
    }

    /// Method in use
    pub fn method(&self) -> GravityMethod {
        self.method
    }

    /// Acceleration felt at `position`, excluding the body at registry index
    /// `exclude` from the sources
    pub fn acceleration(&self, exclude: Option<usize>, position: Vector3) -> Result<Vector3> {
        match self.method {
            GravityMethod::Direct => direct_acceleration(self.sources, exclude, position),
            GravityMethod::BarnesHut => self.tree.acceleration(exclude, position, self.theta),
            GravityMethod::FastMultipole => Err(PhysicsError::UnsupportedGravityMethod(self.method)),
        }
    }
}
