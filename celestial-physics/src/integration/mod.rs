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
//! Numerical integration methods for orbital motion
//!
//! Each integrator advances a single [`Body`] by one timestep, given a
//! callback that evaluates gravitational acceleration at a candidate state.
//! The callback never mutates the body; integrators write position, velocity
//! and the final acceleration back only once the step is complete.
//!
//! # Integrators
//!
//! | Kind | Order | Symplectic | Evaluations per step |
//! |------|-------|------------|----------------------|
//! | Velocity Verlet | 2 | yes | 1 (plus 1 on first use) |
//! | RK4 | 4 | no | 4 |
//! | RK45 Dormand–Prince | 5 (embedded 4) | no | 7 per trial substep |
//! | Gauss–Radau (fixed node) | ~15 nominal | no | 8 |
//!
//! # Choosing an Integrator
//!
//! - **Velocity Verlet**: Default. Bounded energy error over very long runs,
//!   which is what stable planetary orbits need.
//! - **RK4**: Higher short-term accuracy for smooth trajectories.
//! - **RK45**: Adapts its internal substep to an error tolerance. Used for
//!   close encounters where the acceleration changes rapidly.
//! - **Gauss–Radau**: Eight fixed node evaluations per step. Never adaptive.
//!
//! # Per-instance state
//!
//! Velocity Verlet reuses the acceleration from the end of the previous step.
//! That cache lives inside the [`Integrator`] value, keyed by [`BodyId`], so
//! two engines never share it. Callers must [`Integrator::forget`] a body
//! when it is removed.

use crate::body::{Body, BodyId};
use crate::error::{PhysicsError, Result};
use crate::math::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

mod gauss_radau;
mod rk4;
mod rk45;
mod verlet;

pub use gauss_radau::GAUSS_RADAU_NODES;

/// Numerical scheme used to advance a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegratorKind {
    /// Velocity Verlet (leapfrog)
    Verlet,
    /// Classical fourth-order Runge–Kutta
    Rk4,
    /// Adaptive Dormand–Prince 5(4)
    Rk45,
    /// Fixed-node Gauss–Radau
    GaussRadau,
}

impl IntegratorKind {
    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            IntegratorKind::Verlet => "Velocity Verlet",
            IntegratorKind::Rk4 => "Runge-Kutta 4",
            IntegratorKind::Rk45 => "Dormand-Prince RK45",
            IntegratorKind::GaussRadau => "Gauss-Radau",
        }
    }

    /// Nominal order of accuracy
    pub fn order(self) -> u32 {
        match self {
            IntegratorKind::Verlet => 2,
            IntegratorKind::Rk4 => 4,
            IntegratorKind::Rk45 => 5,
            IntegratorKind::GaussRadau => 15,
        }
    }

    /// True if the scheme preserves phase-space volume
    pub fn is_symplectic(self) -> bool {
        matches!(self, IntegratorKind::Verlet)
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorKind {
    type Err = PhysicsError;

    /// Parse one of the accepted names, ignoring case
    ///
    /// ```
    /// use celestial_physics::integration::IntegratorKind;
    ///
    /// assert_eq!("Leapfrog".parse::<IntegratorKind>().unwrap(), IntegratorKind::Verlet);
    /// assert_eq!("ias15".parse::<IntegratorKind>().unwrap(), IntegratorKind::GaussRadau);
    /// assert!("euler".parse::<IntegratorKind>().is_err());
    /// ```
    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "verlet" | "velocity-verlet" | "leapfrog" => Ok(IntegratorKind::Verlet),
            "rk4" | "runge-kutta" => Ok(IntegratorKind::Rk4),
            "rk45" | "adaptive" | "dormand-prince" => Ok(IntegratorKind::Rk45),
            "gauss-radau" | "radau" | "ias15" => Ok(IntegratorKind::GaussRadau),
            _ => Err(PhysicsError::UnknownIntegrator(name.to_string())),
        }
    }
}

/// Step-size control for the adaptive integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveSettings {
    /// Maximum accepted local error (m for position, m/s for velocity)
    pub tolerance: f64,
    /// Smallest trial substep in s; steps this small are always accepted
    pub min_dt: f64,
    /// Largest trial substep in s
    pub max_dt: f64,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        AdaptiveSettings {
            tolerance: 1e-10,
            min_dt: 1e-6,
            max_dt: 3600.0,
        }
    }
}

impl AdaptiveSettings {
    /// Check that the settings describe a usable step-size window
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "adaptive tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if !(self.min_dt > 0.0 && self.min_dt.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "adaptive min_dt must be positive and finite, got {}",
                self.min_dt
            )));
        }
        if !(self.max_dt >= self.min_dt && self.max_dt.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "adaptive max_dt must be finite and >= min_dt ({}), got {}",
                self.min_dt, self.max_dt
            )));
        }
        Ok(())
    }
}

/// An integrator together with its per-instance state
///
/// # Example
///
/// ```
/// use celestial_physics::body::{Body, BodyDefinition};
/// use celestial_physics::integration::{Integrator, IntegratorKind};
/// use celestial_physics::math::Vector3;
///
/// let mut body = Body::new(
///     BodyDefinition::passive("probe", 1.0, 1.0, Vector3::zero())
///         .with_velocity(Vector3::new(1.0, 0.0, 0.0)),
/// )?;
/// let mut integrator = Integrator::new(IntegratorKind::Rk4);
///
/// // Uniform field pointing down -Y
/// integrator.step(&mut body, 1.0, 0.0, |_, _, _, _| Ok(Vector3::new(0.0, -2.0, 0.0)))?;
/// assert!((body.position.x - 1.0).abs() < 1e-12);
/// assert!((body.position.y + 1.0).abs() < 1e-12);
/// # Ok::<(), celestial_physics::PhysicsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Integrator {
    kind: IntegratorKind,
    adaptive: AdaptiveSettings,
    previous_acceleration: HashMap<BodyId, Vector3>,
}

impl Integrator {
    /// Create an integrator with default adaptive settings
    pub fn new(kind: IntegratorKind) -> Self {
        Integrator::with_settings(kind, AdaptiveSettings::default())
    }

    /// Create an integrator with explicit adaptive settings
    pub fn with_settings(kind: IntegratorKind, adaptive: AdaptiveSettings) -> Self {
        Integrator {
            kind,
            adaptive,
            previous_acceleration: HashMap::new(),
        }
    }

    /// Create an integrator from one of its accepted names
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Integrator::new(name.parse()?))
    }

    /// Scheme in use
    pub fn kind(&self) -> IntegratorKind {
        self.kind
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Nominal order of accuracy
    pub fn order(&self) -> u32 {
        self.kind.order()
    }

    /// True if the scheme is symplectic
    pub fn is_symplectic(&self) -> bool {
        self.kind.is_symplectic()
    }

    /// Adaptive step-size settings
    pub fn adaptive_settings(&self) -> &AdaptiveSettings {
        &self.adaptive
    }

    /// Replace the adaptive step-size settings
    pub fn set_adaptive_settings(&mut self, adaptive: AdaptiveSettings) {
        self.adaptive = adaptive;
    }

    /// Advance `body` by `dt` seconds starting at simulation time `time`
    ///
    /// `accel(body, position, velocity, time)` returns the acceleration the
    /// body would feel at that candidate state. Any error it returns aborts
    /// the step and leaves the body untouched.
    pub fn step<F>(&mut self, body: &mut Body, dt: f64, time: f64, accel: F) -> Result<()>
    where
        F: FnMut(&Body, Vector3, Vector3, f64) -> Result<Vector3>,
    {
        match self.kind {
            IntegratorKind::Verlet => {
                verlet::step(&mut self.previous_acceleration, body, dt, time, accel)
            }
            IntegratorKind::Rk4 => rk4::step(body, dt, time, accel),
            IntegratorKind::Rk45 => rk45::step(&self.adaptive, body, dt, time, accel),
            IntegratorKind::GaussRadau => gauss_radau::step(body, dt, time, accel),
        }
    }

    /// Cached end-of-step acceleration for a body (Verlet only)
    pub fn cached_acceleration(&self, id: &BodyId) -> Option<Vector3> {
        self.previous_acceleration.get(id).copied()
    }

    /// Drop any per-body state held for `id`
    pub fn forget(&mut self, id: &BodyId) {
        self.previous_acceleration.remove(id);
    }

    /// Drop all per-body state
    pub fn clear(&mut self) {
        self.previous_acceleration.clear();
    }
}
