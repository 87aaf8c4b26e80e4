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
//! Orchestrating simulation engine
//!
//! [`PhysicsEngine`] owns every body and advances them in fixed timesteps.
//!
//! # Tick pipeline
//!
//! Each call to [`PhysicsEngine::step`] runs:
//!
//! 1. Snapshot every massive body into a [`MassSource`] list and refresh
//!    derived SOI radii
//! 2. Rebuild the octree from the snapshot (Barnes–Hut only)
//! 3. Integrate massive bodies, then passive bodies, each with either the
//!    default or the close-encounter integrator, then advance their spin
//! 4. Detect overlapping pairs (if enabled)
//! 5. Recompute each passive body's dominant parent and record transitions
//!    (if enabled)
//! 6. Advance simulation time and the tick counter, record history
//! 7. Fire collision, SOI and tick callbacks
//!
//! Force evaluation in step 3 reads only the snapshot from step 1, so the
//! order in which bodies are integrated does not change the forces they feel.
//!
//! # Fixed timestep
//!
//! [`PhysicsEngine::update`] accepts wall-clock time, scales it by the time
//! scale and feeds an accumulator that is drained in whole fixed steps. At
//! most `max_substeps` steps run per call; if more than ten steps' worth of
//! time is still pending afterwards it is discarded rather than carried over.
//!
//! # Errors
//!
//! A failure while integrating a body is returned as
//! [`PhysicsError::StepFailed`] naming the body. Bodies integrated earlier in
//! the same tick keep their new state; there is no rollback.

mod config;
pub mod diagnostics;
mod events;
mod world;

pub use config::{EngineConfig, CLOSE_ENCOUNTER_MULTIPLIER, DEFAULT_TIMESTEP, MAX_SUBSTEPS};
pub use diagnostics::EnergyBreakdown;
pub use events::{CollisionEvent, SimulationState, SoiTransitionEvent};
pub use world::{WorldMetadata, WorldState, WORLD_FORMAT_VERSION};

use crate::body::{Body, BodyDefinition, BodyId};
use crate::error::{PhysicsError, Result};
use crate::gravity::{GravityField, GravityMethod, MassSource, Octree};
use crate::integration::Integrator;
use crate::math::Vector3;
use crate::network::BodyNetworkState;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Pending time beyond this many fixed steps is dropped after an update
const ACCUMULATOR_OVERFLOW_STEPS: f64 = 10.0;

type CollisionCallback = Box<dyn FnMut(&CollisionEvent)>;
type SoiCallback = Box<dyn FnMut(&SoiTransitionEvent)>;
type TickCallback = Box<dyn FnMut(&SimulationState)>;

/// N-body simulation engine
///
/// # Example
///
/// ```
/// use celestial_physics::body::BodyDefinition;
/// use celestial_physics::engine::{EngineConfig, PhysicsEngine};
/// use celestial_physics::math::Vector3;
///
/// let mut engine = PhysicsEngine::new(EngineConfig::default())?;
/// engine.add_body(BodyDefinition::massive("sun", 1.989e30, 6.96e8, Vector3::zero()))?;
/// engine.add_body(
///     BodyDefinition::massive("earth", 5.972e24, 6.371e6, Vector3::new(1.496e11, 0.0, 0.0))
///         .with_velocity(Vector3::new(0.0, 29_780.0, 0.0)),
/// )?;
///
/// let steps = engine.update(0.51)?;
/// assert_eq!(steps, 30);
/// assert_eq!(engine.tick(), 30);
/// # Ok::<(), celestial_physics::PhysicsError>(())
/// ```
pub struct PhysicsEngine {
    config: EngineConfig,
    bodies: Vec<Body>,
    index: HashMap<BodyId, usize>,
    massive: Vec<usize>,
    passive: Vec<usize>,
    scan_order: Vec<usize>,
    dominant: HashMap<BodyId, Option<BodyId>>,
    default_integrator: Integrator,
    close_integrator: Integrator,
    tree: Octree,
    sources: Vec<MassSource>,
    accumulator: f64,
    time: f64,
    tick: u64,
    on_collision: Option<CollisionCallback>,
    on_soi_transition: Option<SoiCallback>,
    on_tick: Option<TickCallback>,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        PhysicsEngine::from_valid_config(EngineConfig::default())
    }
}

impl fmt::Debug for PhysicsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsEngine")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("time", &self.time)
            .field("tick", &self.tick)
            .field("accumulator", &self.accumulator)
            .finish_non_exhaustive()
    }
}

impl PhysicsEngine {
    /// Create an empty engine
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is out of range.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(PhysicsEngine::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        PhysicsEngine {
            default_integrator: Integrator::with_settings(config.default_integrator, config.adaptive),
            close_integrator: Integrator::with_settings(config.close_encounter_integrator, config.adaptive),
            config,
            bodies: Vec::new(),
            index: HashMap::new(),
            massive: Vec::new(),
            passive: Vec::new(),
            scan_order: Vec::new(),
            dominant: HashMap::new(),
            tree: Octree::new(),
            sources: Vec::new(),
            accumulator: 0.0,
            time: 0.0,
            tick: 0,
            on_collision: None,
            on_soi_transition: None,
            on_tick: None,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration
    ///
    /// An integrator whose kind changes is recreated, which discards its
    /// per-body state. Adaptive settings and history depth apply immediately.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;

        if config.default_integrator != self.default_integrator.kind() {
            self.default_integrator = Integrator::new(config.default_integrator);
        }
        if config.close_encounter_integrator != self.close_integrator.kind() {
            self.close_integrator = Integrator::new(config.close_encounter_integrator);
        }
        self.default_integrator.set_adaptive_settings(config.adaptive);
        self.close_integrator.set_adaptive_settings(config.adaptive);

        if config.history_depth != self.config.history_depth {
            for body in &mut self.bodies {
                body.set_history_depth(config.history_depth);
            }
        }

        self.config = config;
        Ok(())
    }

    /// Set simulated seconds per wall-clock second
    pub fn set_time_scale(&mut self, scale: f64) -> Result<()> {
        if !(scale >= 0.0 && scale.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_scale must be non-negative and finite, got {}",
                scale
            )));
        }
        self.config.time_scale = scale;
        Ok(())
    }

    /// Simulated seconds per wall-clock second
    pub fn time_scale(&self) -> f64 {
        self.config.time_scale
    }

    /// Register a callback for collision events
    pub fn set_on_collision(&mut self, callback: impl FnMut(&CollisionEvent) + 'static) {
        self.on_collision = Some(Box::new(callback));
    }

    /// Register a callback for SOI transitions
    pub fn set_on_soi_transition(&mut self, callback: impl FnMut(&SoiTransitionEvent) + 'static) {
        self.on_soi_transition = Some(Box::new(callback));
    }

    /// Register a callback run after every tick
    pub fn set_on_tick(&mut self, callback: impl FnMut(&SimulationState) + 'static) {
        self.on_tick = Some(Box::new(callback));
    }

    /// Remove all callbacks
    pub fn clear_callbacks(&mut self) {
        self.on_collision = None;
        self.on_soi_transition = None;
        self.on_tick = None;
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Add a body
    ///
    /// # Errors
    ///
    /// [`PhysicsError::DuplicateBody`] if the id is taken, or
    /// [`PhysicsError::InvalidBody`] if the definition is invalid.
    pub fn add_body(&mut self, definition: BodyDefinition) -> Result<&Body> {
        if self.index.contains_key(&definition.id) {
            return Err(PhysicsError::DuplicateBody(definition.id));
        }
        let mut body = Body::new(definition)?;
        body.set_history_depth(self.config.history_depth);

        let idx = self.bodies.len();
        self.bodies.push(body);
        self.rebuild_indices();
        self.refresh_soi_radii();
        Ok(&self.bodies[idx])
    }

    /// Remove a body and every reference the engine holds to it
    ///
    /// Passive bodies whose dominant parent was the removed body fall back to
    /// no parent; the next tick reports their new parent as a transition.
    pub fn remove_body(&mut self, id: &str) -> Option<Body> {
        let idx = *self.index.get(id)?;
        let body = self.bodies.remove(idx);

        self.default_integrator.forget(body.id());
        self.close_integrator.forget(body.id());
        self.dominant.remove(body.id());
        for parent in self.dominant.values_mut() {
            if parent.as_ref() == Some(body.id()) {
                *parent = None;
            }
        }

        self.rebuild_indices();
        self.refresh_soi_radii();
        Some(body)
    }

    /// Remove every body and reset time, tick and accumulator
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.index.clear();
        self.massive.clear();
        self.passive.clear();
        self.scan_order.clear();
        self.dominant.clear();
        self.default_integrator.clear();
        self.close_integrator.clear();
        self.tree.clear();
        self.sources.clear();
        self.accumulator = 0.0;
        self.time = 0.0;
        self.tick = 0;
    }

    /// Replace the registry with the given bodies
    ///
    /// All definitions are validated before anything is replaced; on error
    /// the engine is unchanged.
    pub fn load_bodies(&mut self, definitions: impl IntoIterator<Item = BodyDefinition>) -> Result<()> {
        let mut seen = HashSet::new();
        let mut bodies = Vec::new();
        for definition in definitions {
            if !seen.insert(definition.id.clone()) {
                return Err(PhysicsError::DuplicateBody(definition.id));
            }
            let mut body = Body::new(definition)?;
            body.set_history_depth(self.config.history_depth);
            bodies.push(body);
        }

        self.clear();
        self.bodies = bodies;
        self.rebuild_indices();
        self.refresh_soi_radii();
        Ok(())
    }

    /// Replace the registry with the contents of a world file
    ///
    /// # Errors
    ///
    /// [`PhysicsError::IncompatibleWorld`] if the format version cannot be
    /// read, otherwise as for [`PhysicsEngine::load_bodies`].
    pub fn load_world(&mut self, world: &WorldState) -> Result<()> {
        world.check_compatible()?;
        self.load_bodies(world.bodies.iter().cloned())?;
        info!(
            "loaded world '{}' ({} bodies, format {})",
            world.name,
            self.bodies.len(),
            world.format_version
        );
        Ok(())
    }

    /// Describe the current registry as a world file
    pub fn export_world(&self, name: impl Into<String>, description: impl Into<String>) -> WorldState {
        WorldState {
            description: description.into(),
            bodies: self.bodies.iter().map(Body::to_definition).collect(),
            metadata: Some(WorldMetadata {
                export_time: self.time,
                export_tick: self.tick,
            }),
            ..WorldState::new(name)
        }
    }

    fn rebuild_indices(&mut self) {
        self.index.clear();
        self.massive.clear();
        self.passive.clear();
        for (idx, body) in self.bodies.iter().enumerate() {
            self.index.insert(body.id().clone(), idx);
            if body.is_massive() {
                self.massive.push(idx);
            } else {
                self.passive.push(idx);
            }
        }
        self.scan_order.clear();
        self.scan_order.extend(self.massive.iter().chain(self.passive.iter()).copied());

        let mut children: HashMap<BodyId, Vec<BodyId>> = HashMap::new();
        for body in &self.bodies {
            if let Some(parent) = body.parent_id() {
                children.entry(parent.clone()).or_default().push(body.id().clone());
            }
        }
        for body in &mut self.bodies {
            let list = children.remove(body.id()).unwrap_or_default();
            body.set_children(list);
        }
    }

    fn refresh_soi_radii(&mut self) {
        for i in 0..self.bodies.len() {
            let parent = self.bodies[i]
                .parent_id()
                .and_then(|p| self.index.get(p))
                .map(|&p| MassSource::from_body(p, &self.bodies[p]));
            self.bodies[i].refresh_soi(parent.as_ref());
        }
    }

    /// Look up a body by id
    pub fn body(&self, id: &str) -> Option<&Body> {
        self.index.get(id).map(|&idx| &self.bodies[idx])
    }

    /// Mutable access to a body
    ///
    /// Cached integrator state for the body is dropped, so externally
    /// applied changes to position or velocity take effect cleanly.
    pub fn body_mut(&mut self, id: &str) -> Option<&mut Body> {
        let idx = *self.index.get(id)?;
        self.default_integrator.forget(self.bodies[idx].id());
        self.close_integrator.forget(self.bodies[idx].id());
        Some(&mut self.bodies[idx])
    }

    /// All bodies in insertion order
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Massive bodies in insertion order
    pub fn massive_bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.massive.iter().map(move |&idx| &self.bodies[idx])
    }

    /// Passive bodies in insertion order
    pub fn passive_bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.passive.iter().map(move |&idx| &self.bodies[idx])
    }

    /// Number of registered bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Dominant parent recorded for a passive body at the last tick
    pub fn current_soi(&self, id: &str) -> Option<&BodyId> {
        self.dominant.get(id).and_then(Option::as_ref)
    }

    /// Octree from the most recent Barnes–Hut tick
    pub fn tree(&self) -> &Octree {
        &self.tree
    }

    // ---------------------------------------------------------------------
    // Time
    // ---------------------------------------------------------------------

    /// Simulation time in s
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ticks completed
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Fraction of a fixed step pending in the accumulator, for rendering
    /// between ticks
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.config.fixed_timestep
    }

    /// Advance by wall-clock time, running whole fixed steps
    ///
    /// Returns the number of fixed steps taken.
    pub fn update(&mut self, wall_dt: f64) -> Result<usize> {
        if !(wall_dt >= 0.0 && wall_dt.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "update delta must be non-negative and finite, got {}",
                wall_dt
            )));
        }
        self.accumulator += wall_dt * self.config.time_scale;

        let dt = self.config.fixed_timestep;
        let mut steps = 0;
        while self.accumulator >= dt && steps < self.config.max_substeps {
            self.step(dt)?;
            self.accumulator -= dt;
            steps += 1;
        }

        if self.accumulator > dt * ACCUMULATOR_OVERFLOW_STEPS {
            warn!(
                "accumulator overflow after {} substeps, discarding {:.3} s of simulation time",
                steps, self.accumulator
            );
            self.accumulator = 0.0;
        }
        Ok(steps)
    }

    /// Run one tick of `dt` seconds
    pub fn step(&mut self, dt: f64) -> Result<()> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "step size must be positive and finite, got {}",
                dt
            )));
        }

        self.capture_sources();
        self.refresh_soi_radii();
        if self.config.gravity_method == GravityMethod::BarnesHut {
            self.tree.build(&self.sources)?;
            let stats = self.tree.stats();
            debug!(
                "tick {}: octree rebuilt with {} nodes, {} leaves, depth {}",
                self.tick, stats.nodes, stats.leaves, stats.max_depth
            );
        }

        self.integrate(dt)?;

        let collisions = if self.config.enable_collisions {
            diagnostics::detect_collisions(&self.bodies, &self.scan_order, self.time)
        } else {
            Vec::new()
        };
        let transitions = if self.config.enable_soi {
            self.track_soi()
        } else {
            Vec::new()
        };

        self.time += dt;
        self.tick += 1;
        if self.config.record_history {
            for body in &mut self.bodies {
                body.record_snapshot(self.time);
            }
        }

        if let Some(callback) = self.on_collision.as_mut() {
            for event in &collisions {
                callback(event);
            }
        }
        if let Some(callback) = self.on_soi_transition.as_mut() {
            for event in &transitions {
                callback(event);
            }
        }
        if self.on_tick.is_some() {
            let state = self.state();
            if let Some(callback) = self.on_tick.as_mut() {
                callback(&state);
            }
        }
        Ok(())
    }

    fn capture_sources(&mut self) {
        self.sources.clear();
        for &idx in &self.massive {
            self.sources.push(MassSource::from_body(idx, &self.bodies[idx]));
        }
    }

    fn integrate(&mut self, dt: f64) -> Result<()> {
        let PhysicsEngine {
            config,
            bodies,
            scan_order,
            sources,
            tree,
            default_integrator,
            close_integrator,
            time,
            ..
        } = self;
        let sources: &[MassSource] = sources;
        let field = GravityField::new(config.gravity_method, config.theta, tree, sources);

        for &idx in scan_order.iter() {
            let body = &mut bodies[idx];
            let close = config.enable_soi
                && in_close_encounter(sources, idx, body.position, config.close_encounter_multiplier);
            // A cached a0 is only valid for the integrator that produced it
            let integrator = if close {
                default_integrator.forget(body.id());
                &mut *close_integrator
            } else {
                close_integrator.forget(body.id());
                &mut *default_integrator
            };

            let result = integrator.step(body, dt, *time, |_, position, _, _| {
                field.acceleration(Some(idx), position)
            });
            if let Err(source) = result {
                return Err(PhysicsError::StepFailed {
                    body: body.id().clone(),
                    source: Box::new(source),
                });
            }
            body.update_rotation(dt);
        }
        Ok(())
    }

    fn track_soi(&mut self) -> Vec<SoiTransitionEvent> {
        let mut events = Vec::new();
        for &idx in &self.passive {
            let body = &self.bodies[idx];
            let current = diagnostics::dominant_body(&self.bodies, &self.massive, body.position)
                .map(|d| self.bodies[d].id().clone());
            let previous = self.dominant.get(body.id()).cloned().flatten();
            if current != previous {
                events.push(SoiTransitionEvent {
                    body: body.id().clone(),
                    from: previous,
                    to: current.clone(),
                    timestamp: self.time,
                });
                self.dominant.insert(body.id().clone(), current);
            }
        }
        events
    }

    // ---------------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------------

    /// Kinetic and potential energy of the system
    pub fn energy(&self) -> EnergyBreakdown {
        diagnostics::energy(&self.bodies, &self.massive)
    }

    /// Total angular momentum about the origin
    pub fn angular_momentum(&self) -> Vector3 {
        diagnostics::angular_momentum(&self.bodies)
    }

    /// Barycenter of all bodies
    pub fn center_of_mass(&self) -> Vector3 {
        diagnostics::center_of_mass(&self.bodies)
    }

    /// Summary of time, counts and energy
    pub fn state(&self) -> SimulationState {
        let energy = self.energy();
        SimulationState {
            time: self.time,
            tick: self.tick,
            body_count: self.bodies.len(),
            massive_bodies: self.massive.len(),
            passive_bodies: self.passive.len(),
            kinetic_energy: energy.kinetic,
            potential_energy: energy.potential,
            total_energy: energy.total,
        }
    }

    // ---------------------------------------------------------------------
    // Replication
    // ---------------------------------------------------------------------

    /// Network records for every body, stamped with the simulation time
    pub fn export_states(&self) -> Vec<BodyNetworkState> {
        self.bodies.iter().map(|b| b.to_network_state(self.time)).collect()
    }

    /// Apply authoritative records; returns how many matched a body
    ///
    /// Each applied record is also pushed into the body's history at the
    /// record's timestamp. Records for unknown ids are skipped.
    pub fn import_states(&mut self, states: &[BodyNetworkState]) -> usize {
        let mut applied = 0;
        for state in states {
            let Some(&idx) = self.index.get(&state.id) else {
                debug!("skipping network state for unknown body '{}'", state.id);
                continue;
            };
            let body = &mut self.bodies[idx];
            body.apply_network_state(state);
            body.record_snapshot(state.timestamp);
            self.default_integrator.forget(&state.id);
            self.close_integrator.forget(&state.id);
            applied += 1;
        }
        applied
    }
}

fn in_close_encounter(sources: &[MassSource], idx: usize, position: Vector3, multiplier: f64) -> bool {
    sources
        .iter()
        .any(|s| s.body != idx && s.position.distance_to(position) < s.radius * multiplier)
}
