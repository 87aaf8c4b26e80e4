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
//! Celestial bodies
//!
//! A [`Body`] is a point mass with a finite radius, a rotation state and a
//! short history of past snapshots used for client-side interpolation.
//! Bodies come in two kinds:
//!
//! - **Massive** bodies (stars, planets, moons) exert gravity and are inserted
//!   into the spatial tree every tick.
//! - **Passive** bodies (spacecraft, debris) feel gravity but exert none.
//!
//! Bodies are created from a [`BodyDefinition`], which is plain data and can
//! be loaded from or written to a world file.

mod history;

pub use history::{BodySnapshot, SnapshotHistory, DEFAULT_HISTORY_DEPTH};

use crate::error::{PhysicsError, Result};
use crate::gravity::{MassSource, DEFAULT_SOFTENING, GRAVITATIONAL_CONSTANT};
use crate::math::{Quaternion, Vector3};
use crate::network::BodyNetworkState;
use crate::orbital;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::f64::consts::TAU;
use std::fmt;

/// Stable, unique identifier for a body
///
/// # Examples
///
/// ```
/// use celestial_physics::body::BodyId;
///
/// let id = BodyId::from("earth");
/// assert_eq!(id.as_str(), "earth");
/// assert_eq!(id.to_string(), "earth");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(String);

impl BodyId {
    /// Create an id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        BodyId(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BodyId {
    fn from(id: &str) -> Self {
        BodyId(id.to_owned())
    }
}

impl From<String> for BodyId {
    fn from(id: String) -> Self {
        BodyId(id)
    }
}

impl Borrow<str> for BodyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BodyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a body participates as a gravity source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// Exerts and feels gravity
    #[default]
    Massive,
    /// Feels gravity only
    Passive,
}

fn default_softening() -> f64 {
    DEFAULT_SOFTENING
}

/// Serializable description of a body
///
/// Only `id`, `mass`, `radius` and `position` are required in a world file;
/// every other field has a sensible default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDefinition {
    /// Unique id
    pub id: BodyId,
    /// Display name; the id is used when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Massive or passive
    #[serde(default)]
    pub kind: BodyKind,
    /// Mass in kg
    pub mass: f64,
    /// Radius in m
    pub radius: f64,
    /// Gravitational softening length in m
    #[serde(default = "default_softening")]
    pub softening: f64,
    /// Initial position in m
    pub position: Vector3,
    /// Initial velocity in m/s
    #[serde(default)]
    pub velocity: Vector3,
    /// Initial orientation; derived from `axial_tilt` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Quaternion>,
    /// Sidereal rotation period in s; zero means no rotation
    #[serde(default)]
    pub rotation_period: f64,
    /// Axial tilt in radians about the Z axis
    #[serde(default)]
    pub axial_tilt: f64,
    /// Informational parent body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<BodyId>,
    /// Explicit sphere-of-influence radius in m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soi_radius: Option<f64>,
}

impl BodyDefinition {
    /// Minimal definition of a massive body at rest
    pub fn massive(id: impl Into<BodyId>, mass: f64, radius: f64, position: Vector3) -> Self {
        BodyDefinition {
            id: id.into(),
            name: None,
            kind: BodyKind::Massive,
            mass,
            radius,
            softening: DEFAULT_SOFTENING,
            position,
            velocity: Vector3::zero(),
            orientation: None,
            rotation_period: 0.0,
            axial_tilt: 0.0,
            parent_id: None,
            soi_radius: None,
        }
    }

    /// Minimal definition of a passive body at rest
    pub fn passive(id: impl Into<BodyId>, mass: f64, radius: f64, position: Vector3) -> Self {
        BodyDefinition {
            kind: BodyKind::Passive,
            ..BodyDefinition::massive(id, mass, radius, position)
        }
    }

    /// Massive body on a circular orbit around `parent`
    ///
    /// The body starts `distance` metres along +X from the parent, moving
    /// along +Z at circular speed relative to the parent's velocity.
    pub fn orbiting(
        id: impl Into<BodyId>,
        mass: f64,
        radius: f64,
        parent: &BodyDefinition,
        distance: f64,
    ) -> Self {
        let speed = orbital::circular_orbital_velocity(GRAVITATIONAL_CONSTANT * parent.mass, distance);
        BodyDefinition {
            velocity: parent.velocity + Vector3::unit_z() * speed,
            parent_id: Some(parent.id.clone()),
            ..BodyDefinition::massive(id, mass, radius, parent.position + Vector3::unit_x() * distance)
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vector3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the softening length
    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening = softening;
        self
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the rotation period and axial tilt
    pub fn with_rotation(mut self, period: f64, axial_tilt: f64) -> Self {
        self.rotation_period = period;
        self.axial_tilt = axial_tilt;
        self
    }

    /// Set the informational parent
    pub fn with_parent(mut self, parent: impl Into<BodyId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Set an explicit sphere-of-influence radius
    pub fn with_soi_radius(mut self, radius: f64) -> Self {
        self.soi_radius = Some(radius);
        self
    }
}

/// A simulated celestial body
///
/// Physical constants (mass, radius, softening) are fixed at construction and
/// validated there. Kinematic state is public so integrators and network
/// replication can write it directly.
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    name: String,
    kind: BodyKind,
    mass: f64,
    radius: f64,
    softening: f64,
    rotation_period: f64,
    axial_tilt: f64,
    parent_id: Option<BodyId>,
    children: Vec<BodyId>,
    soi_override: Option<f64>,
    soi_radius: f64,
    history: SnapshotHistory,

    /// Position in m
    pub position: Vector3,
    /// Velocity in m/s
    pub velocity: Vector3,
    /// Orientation (unit quaternion)
    pub orientation: Quaternion,
    /// Spin rate about the local Y axis in rad/s
    pub angular_velocity: f64,
    /// Acceleration computed during the last step in m/s²
    pub acceleration: Vector3,
}

fn invalid(id: &BodyId, reason: impl Into<String>) -> PhysicsError {
    PhysicsError::InvalidBody {
        id: id.clone(),
        reason: reason.into(),
    }
}

impl Body {
    /// Build a body from a definition
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidBody`] if the mass or radius is not
    /// positive and finite, the softening is negative or not finite, or the
    /// initial position or velocity is not finite.
    pub fn new(def: BodyDefinition) -> Result<Self> {
        let id = def.id;
        if !(def.mass > 0.0 && def.mass.is_finite()) {
            return Err(invalid(&id, format!("mass must be positive and finite, got {}", def.mass)));
        }
        if !(def.radius > 0.0 && def.radius.is_finite()) {
            return Err(invalid(&id, format!("radius must be positive and finite, got {}", def.radius)));
        }
        if !(def.softening >= 0.0 && def.softening.is_finite()) {
            return Err(invalid(
                &id,
                format!("softening must be non-negative and finite, got {}", def.softening),
            ));
        }
        if !def.position.is_finite() || !def.velocity.is_finite() {
            return Err(invalid(&id, "initial position and velocity must be finite"));
        }
        if !def.rotation_period.is_finite() || !def.axial_tilt.is_finite() {
            return Err(invalid(&id, "rotation period and axial tilt must be finite"));
        }
        if let Some(soi) = def.soi_radius {
            if !(soi > 0.0) {
                return Err(invalid(&id, format!("soi radius must be positive, got {}", soi)));
            }
        }

        let orientation = def
            .orientation
            .unwrap_or_else(|| Quaternion::from_axis_angle(Vector3::unit_z(), def.axial_tilt))
            .normalize();
        let angular_velocity = if def.rotation_period != 0.0 {
            TAU / def.rotation_period
        } else {
            0.0
        };

        Ok(Body {
            name: def.name.unwrap_or_else(|| id.to_string()),
            id,
            kind: def.kind,
            mass: def.mass,
            radius: def.radius,
            softening: def.softening,
            rotation_period: def.rotation_period,
            axial_tilt: def.axial_tilt,
            parent_id: def.parent_id,
            children: Vec::new(),
            soi_override: def.soi_radius,
            soi_radius: def.soi_radius.unwrap_or(f64::INFINITY),
            history: SnapshotHistory::new(DEFAULT_HISTORY_DEPTH),
            position: def.position,
            velocity: def.velocity,
            orientation,
            angular_velocity,
            acceleration: Vector3::zero(),
        })
    }

    /// Plain-data description of the current state
    pub fn to_definition(&self) -> BodyDefinition {
        BodyDefinition {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            kind: self.kind,
            mass: self.mass,
            radius: self.radius,
            softening: self.softening,
            position: self.position,
            velocity: self.velocity,
            orientation: Some(self.orientation),
            rotation_period: self.rotation_period,
            axial_tilt: self.axial_tilt,
            parent_id: self.parent_id.clone(),
            soi_radius: self.soi_override,
        }
    }

    /// Unique id
    pub fn id(&self) -> &BodyId {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Massive or passive
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// True for bodies that act as gravity sources
    pub fn is_massive(&self) -> bool {
        self.kind == BodyKind::Massive
    }

    /// Mass in kg
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Radius in m
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Softening length in m
    pub fn softening(&self) -> f64 {
        self.softening
    }

    /// Rotation period in s (zero for non-rotating bodies)
    pub fn rotation_period(&self) -> f64 {
        self.rotation_period
    }

    /// Axial tilt in radians
    pub fn axial_tilt(&self) -> f64 {
        self.axial_tilt
    }

    /// Informational parent id
    pub fn parent_id(&self) -> Option<&BodyId> {
        self.parent_id.as_ref()
    }

    /// Informational child ids
    pub fn children(&self) -> &[BodyId] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<BodyId>) {
        self.children = children;
    }

    /// Sphere-of-influence radius in m
    ///
    /// Infinite unless set explicitly or derived from a registered parent.
    pub fn soi_radius(&self) -> f64 {
        self.soi_radius
    }

    /// Recompute the SOI radius against the given parent
    ///
    /// An explicit radius always wins. Otherwise the Laplace radius
    /// `r·(m/M)^(2/5)` is used at the current separation, or infinity when
    /// there is no parent.
    pub fn refresh_soi(&mut self, parent: Option<&MassSource>) {
        self.soi_radius = match (self.soi_override, parent) {
            (Some(explicit), _) => explicit,
            (None, Some(parent)) => orbital::sphere_of_influence(
                self.position.distance_to(parent.position),
                self.mass,
                parent.mass,
            ),
            (None, None) => f64::INFINITY,
        };
    }

    /// Standard gravitational parameter μ = G·m
    pub fn mu(&self) -> f64 {
        GRAVITATIONAL_CONSTANT * self.mass
    }

    /// Kinetic energy ½mv²
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Linear momentum m·v
    pub fn momentum(&self) -> Vector3 {
        self.velocity * self.mass
    }

    /// Escape velocity at the surface
    pub fn escape_velocity(&self) -> f64 {
        (2.0 * self.mu() / self.radius).sqrt()
    }

    /// Surface gravity magnitude
    pub fn surface_gravity(&self) -> f64 {
        self.mu() / (self.radius * self.radius)
    }

    /// Speed of a circular orbit at the given altitude above the surface
    pub fn circular_orbit_velocity(&self, altitude: f64) -> f64 {
        orbital::circular_orbital_velocity(self.mu(), self.radius + altitude)
    }

    /// Height of a point above the surface
    pub fn altitude(&self, point: Vector3) -> f64 {
        self.position.distance_to(point) - self.radius
    }

    /// True when the point lies inside this body's sphere of influence
    pub fn is_in_soi(&self, point: Vector3) -> bool {
        self.position.distance_to(point) < self.soi_radius
    }

    /// Outward surface normal below a point (zero at the center)
    pub fn local_up(&self, point: Vector3) -> Vector3 {
        (point - self.position).safe_normalize()
    }

    /// Spin axis in world space
    pub fn spin_axis(&self) -> Vector3 {
        self.orientation.rotate_vector(Vector3::unit_y())
    }

    /// Velocity of a co-rotating point due to spin alone
    pub fn surface_velocity(&self, point: Vector3) -> Vector3 {
        (self.spin_axis() * self.angular_velocity).cross(point - self.position)
    }

    /// Advance the spin about the local Y axis at `angular_velocity`
    ///
    /// The rate starts as `2π / rotation_period` and follows replicated
    /// state afterwards.
    pub fn update_rotation(&mut self, dt: f64) {
        if self.angular_velocity == 0.0 {
            return;
        }
        let delta = Quaternion::from_axis_angle(Vector3::unit_y(), self.angular_velocity * dt);
        self.orientation = self.orientation.multiply(delta).normalize();
    }

    /// Snapshot history
    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Change how many snapshots are retained
    pub fn set_history_depth(&mut self, depth: usize) {
        self.history.set_depth(depth);
    }

    /// Push the current kinematic state into the history
    pub fn record_snapshot(&mut self, time: f64) {
        let snapshot = BodySnapshot {
            time,
            position: self.position,
            velocity: self.velocity,
            orientation: self.orientation,
            angular_velocity: self.angular_velocity,
        };
        self.history.push(snapshot);
    }

    /// State interpolated between the snapshots bracketing `time`
    ///
    /// Returns `None` with fewer than two snapshots, and the latest snapshot
    /// when `time` is outside the recorded range.
    pub fn interpolated_state(&self, time: f64) -> Option<BodySnapshot> {
        self.history.interpolate(time)
    }

    /// Network replication record stamped with `timestamp`
    pub fn to_network_state(&self, timestamp: f64) -> BodyNetworkState {
        BodyNetworkState {
            id: self.id.clone(),
            position: self.position.to_array(),
            velocity: self.velocity.to_array(),
            orientation: self.orientation.to_array(),
            angular_velocity: self.angular_velocity,
            timestamp,
        }
    }

    /// Overwrite kinematic state from a replication record
    pub fn apply_network_state(&mut self, state: &BodyNetworkState) {
        self.position = Vector3::from_array(state.position);
        self.velocity = Vector3::from_array(state.velocity);
        self.orientation = Quaternion::from_array(state.orientation).normalize();
        self.angular_velocity = state.angular_velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet() -> Body {
        Body::new(BodyDefinition::massive("earth", 5.972e24, 6.371e6, Vector3::zero()))
            .expect("valid body")
    }

    #[test]
    fn test_rejects_non_positive_mass_and_radius() {
        let zero_mass = BodyDefinition::massive("a", 0.0, 1.0, Vector3::zero());
        assert!(matches!(Body::new(zero_mass), Err(PhysicsError::InvalidBody { .. })));

        let nan_radius = BodyDefinition::massive("b", 1.0, f64::NAN, Vector3::zero());
        assert!(matches!(Body::new(nan_radius), Err(PhysicsError::InvalidBody { .. })));

        let negative_softening =
            BodyDefinition::massive("c", 1.0, 1.0, Vector3::zero()).with_softening(-1.0);
        assert!(matches!(
            Body::new(negative_softening),
            Err(PhysicsError::InvalidBody { .. })
        ));
    }

    #[test]
    fn test_zero_softening_is_honored() {
        let body = Body::new(
            BodyDefinition::massive("s", 1.0, 1.0, Vector3::zero()).with_softening(0.0),
        )
        .expect("valid body");
        assert_eq!(body.softening(), 0.0);
        assert_eq!(planet().softening(), DEFAULT_SOFTENING);
    }

    #[test]
    fn test_surface_quantities() {
        let earth = planet();
        assert!((earth.surface_gravity() - 9.82).abs() < 0.05);
        assert!((earth.escape_velocity() - 11_186.0).abs() < 50.0);
        assert_eq!(earth.altitude(Vector3::new(7.371e6, 0.0, 0.0)), 1.0e6);
        assert_eq!(earth.local_up(Vector3::new(0.0, 0.0, 5.0)), Vector3::unit_z());
    }

    #[test]
    fn test_rotation_without_period_is_noop() {
        let mut earth = planet();
        let before = earth.orientation;
        earth.update_rotation(10.0);
        assert_eq!(earth.orientation, before);
    }

    #[test]
    fn test_full_period_returns_to_start() {
        let mut spinner = Body::new(
            BodyDefinition::massive("spin", 1.0, 1.0, Vector3::zero()).with_rotation(100.0, 0.0),
        )
        .expect("valid body");
        for _ in 0..100 {
            spinner.update_rotation(1.0);
        }
        let axis = spinner.orientation.rotate_vector(Vector3::unit_x());
        assert!((axis - Vector3::unit_x()).length() < 1e-9);
        assert!((spinner.angular_velocity - TAU / 100.0).abs() < 1e-15);
    }

    #[test]
    fn test_soi_explicit_wins_over_parent() {
        let sun = Body::new(BodyDefinition::massive("sun", 1.989e30, 6.96e8, Vector3::zero()))
            .expect("valid body");
        let mut earth = Body::new(
            BodyDefinition::massive("earth", 5.972e24, 6.371e6, Vector3::new(1.496e11, 0.0, 0.0))
                .with_parent("sun"),
        )
        .expect("valid body");
        assert!(earth.soi_radius().is_infinite());

        earth.refresh_soi(Some(&MassSource::from_body(0, &sun)));
        assert!((earth.soi_radius() - 9.24e8).abs() / 9.24e8 < 0.01);

        let mut pinned = Body::new(
            BodyDefinition::massive("moon", 7.3e22, 1.7e6, Vector3::zero()).with_soi_radius(6.6e7),
        )
        .expect("valid body");
        pinned.refresh_soi(Some(&MassSource::from_body(0, &sun)));
        pinned.refresh_soi(None);
        assert_eq!(pinned.soi_radius(), 6.6e7);
        earth.refresh_soi(None);
        assert!(earth.soi_radius().is_infinite());
        assert_eq!(pinned.soi_radius(), 6.6e7);
    }

    #[test]
    fn test_orbiting_sets_circular_speed() {
        let sun = BodyDefinition::massive("sun", 1.989e30, 6.96e8, Vector3::new(1.0, 2.0, 3.0));
        let earth = BodyDefinition::orbiting("earth", 5.972e24, 6.371e6, &sun, 1.496e11);
        assert_eq!(earth.position, Vector3::new(1.0 + 1.496e11, 2.0, 3.0));
        assert_eq!(earth.velocity.x, 0.0);
        assert!((earth.velocity.z - 29_780.0).abs() < 30.0);
        assert_eq!(earth.parent_id.as_ref().map(BodyId::as_str), Some("sun"));
    }

    #[test]
    fn test_network_state_round_trip_normalizes_orientation() {
        let mut earth = planet();
        earth.velocity = Vector3::new(1.0, 2.0, 3.0);
        let mut state = earth.to_network_state(12.5);
        assert_eq!(state.timestamp, 12.5);

        state.orientation = [0.0, 0.0, 0.0, 2.0];
        state.position = [4.0, 5.0, 6.0];
        earth.apply_network_state(&state);
        assert_eq!(earth.position, Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(earth.orientation, Quaternion::identity());
    }

    #[test]
    fn test_replicated_spin_rate_drives_rotation() {
        let mut earth = planet();
        let mut state = earth.to_network_state(0.0);
        state.angular_velocity = std::f64::consts::FRAC_PI_2;
        earth.apply_network_state(&state);

        earth.update_rotation(1.0);
        let x = earth.orientation.rotate_vector(Vector3::unit_x());
        assert!(x.x.abs() < 1e-12);
        assert!((x.z.abs() - 1.0).abs() < 1e-12);
        assert_eq!(earth.to_network_state(1.0).angular_velocity, std::f64::consts::FRAC_PI_2);
    }
}
