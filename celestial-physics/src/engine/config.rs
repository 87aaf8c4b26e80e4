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
//! Engine configuration

use crate::body::DEFAULT_HISTORY_DEPTH;
use crate::error::{PhysicsError, Result};
use crate::gravity::{GravityMethod, DEFAULT_THETA};
use crate::integration::{AdaptiveSettings, IntegratorKind};
use serde::{Deserialize, Serialize};

/// Fixed simulation timestep (60 Hz)
pub const DEFAULT_TIMESTEP: f64 = 1.0 / 60.0;

/// Maximum fixed steps run by a single `update` call
pub const MAX_SUBSTEPS: usize = 1000;

/// Close-encounter distance as a multiple of the other body's radius
pub const CLOSE_ENCOUNTER_MULTIPLIER: f64 = 5.0;

/// Configuration for [`super::PhysicsEngine`]
///
/// Every field has a default, so a partial JSON document deserializes into a
/// complete configuration.
///
/// # Example
///
/// ```
/// use celestial_physics::engine::EngineConfig;
/// use celestial_physics::gravity::GravityMethod;
///
/// let config = EngineConfig::default()
///     .with_gravity_method(GravityMethod::Direct)
///     .with_timestep(60.0)
///     .with_collisions(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed step in simulated seconds (default: 1/60)
    pub fixed_timestep: f64,
    /// Force evaluation strategy (default: Barnes–Hut)
    pub gravity_method: GravityMethod,
    /// Barnes–Hut opening angle (default: 0.5)
    pub theta: f64,
    /// Integrator used away from close encounters (default: Verlet)
    pub default_integrator: IntegratorKind,
    /// Integrator used during close encounters (default: RK45)
    pub close_encounter_integrator: IntegratorKind,
    /// Close encounter when nearer than this many radii of another massive body
    pub close_encounter_multiplier: f64,
    /// Simulated seconds per wall-clock second (default: 1)
    pub time_scale: f64,
    /// Cap on fixed steps per `update` call (default: 1000)
    pub max_substeps: usize,
    /// Emit collision events (default: true)
    pub enable_collisions: bool,
    /// Track sphere-of-influence transitions and switch to the
    /// close-encounter integrator near massive bodies (default: true)
    pub enable_soi: bool,
    /// Step-size control for the adaptive integrator
    pub adaptive: AdaptiveSettings,
    /// Snapshots retained per body (default: 10)
    pub history_depth: usize,
    /// Record a snapshot of every body after each tick (default: false)
    pub record_history: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            fixed_timestep: DEFAULT_TIMESTEP,
            gravity_method: GravityMethod::BarnesHut,
            theta: DEFAULT_THETA,
            default_integrator: IntegratorKind::Verlet,
            close_encounter_integrator: IntegratorKind::Rk45,
            close_encounter_multiplier: CLOSE_ENCOUNTER_MULTIPLIER,
            time_scale: 1.0,
            max_substeps: MAX_SUBSTEPS,
            enable_collisions: true,
            enable_soi: true,
            adaptive: AdaptiveSettings::default(),
            history_depth: DEFAULT_HISTORY_DEPTH,
            record_history: false,
        }
    }
}

impl EngineConfig {
    /// Set the fixed timestep
    pub fn with_timestep(mut self, dt: f64) -> Self {
        self.fixed_timestep = dt;
        self
    }

    /// Set the gravity method
    pub fn with_gravity_method(mut self, method: GravityMethod) -> Self {
        self.gravity_method = method;
        self
    }

    /// Set the Barnes–Hut opening angle
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// Set both integrators
    pub fn with_integrators(mut self, default: IntegratorKind, close_encounter: IntegratorKind) -> Self {
        self.default_integrator = default;
        self.close_encounter_integrator = close_encounter;
        self
    }

    /// Set the close-encounter multiplier
    pub fn with_close_encounter_multiplier(mut self, multiplier: f64) -> Self {
        self.close_encounter_multiplier = multiplier;
        self
    }

    /// Set the time scale
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale;
        self
    }

    /// Set the substep cap
    pub fn with_max_substeps(mut self, max: usize) -> Self {
        self.max_substeps = max;
        self
    }

    /// Enable or disable collision detection
    pub fn with_collisions(mut self, enabled: bool) -> Self {
        self.enable_collisions = enabled;
        self
    }

    /// Enable or disable SOI tracking and close-encounter switching
    pub fn with_soi(mut self, enabled: bool) -> Self {
        self.enable_soi = enabled;
        self
    }

    /// Set the adaptive integrator settings
    pub fn with_adaptive(mut self, adaptive: AdaptiveSettings) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Record per-tick history with the given depth
    pub fn with_history(mut self, depth: usize) -> Self {
        self.record_history = true;
        self.history_depth = depth;
        self
    }

    /// Check every field against its valid range
    ///
    /// # Errors
    ///
    /// [`PhysicsError::InvalidConfig`] for out-of-range values and
    /// [`PhysicsError::UnsupportedGravityMethod`] for the reserved method.
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_timestep > 0.0 && self.fixed_timestep.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "fixed_timestep must be positive and finite, got {}",
                self.fixed_timestep
            )));
        }
        if !(self.theta >= 0.0 && self.theta.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "theta must be non-negative and finite, got {}",
                self.theta
            )));
        }
        if !(self.time_scale >= 0.0 && self.time_scale.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_scale must be non-negative and finite, got {}",
                self.time_scale
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig(
                "max_substeps must be at least 1".to_string(),
            ));
        }
        if !(self.close_encounter_multiplier >= 0.0 && self.close_encounter_multiplier.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "close_encounter_multiplier must be non-negative and finite, got {}",
                self.close_encounter_multiplier
            )));
        }
        if self.gravity_method == GravityMethod::FastMultipole {
            return Err(PhysicsError::UnsupportedGravityMethod(self.gravity_method));
        }
        self.adaptive.validate()
    }
}
