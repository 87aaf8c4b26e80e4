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
//! Conservation diagnostics and pairwise scans
//!
//! Everything here is read-only over the body registry. The O(n²) scans run
//! row by row on the rayon pool when the `parallel` feature is enabled; rows
//! are collected in index order and combined sequentially, so the result is
//! identical with or without the feature.
//!
//! Potential energy is the unsoftened pairwise sum over massive bodies:
//!
//! **U = -Σ G·mᵢ·mⱼ / rᵢⱼ** (i < j, rᵢⱼ > 0)

use super::events::CollisionEvent;
use crate::body::Body;
use crate::gravity::GRAVITATIONAL_CONSTANT;
use crate::math::Vector3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Kinetic and potential energy of the system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    /// Σ ½mv² over all bodies (J)
    pub kinetic: f64,
    /// Pairwise gravitational potential over massive bodies (J)
    pub potential: f64,
    /// kinetic + potential (J)
    pub total: f64,
}

/// Energy of the system
///
/// `massive` lists registry indices of the bodies that contribute potential.
pub fn energy(bodies: &[Body], massive: &[usize]) -> EnergyBreakdown {
    let kinetic: f64 = bodies.iter().map(Body::kinetic_energy).sum();
    let potential = potential_energy(bodies, massive);
    EnergyBreakdown {
        kinetic,
        potential,
        total: kinetic + potential,
    }
}

fn potential_row(bodies: &[Body], massive: &[usize], i: usize) -> f64 {
    let a = &bodies[massive[i]];
    let mut sum = 0.0;
    for &j in &massive[i + 1..] {
        let b = &bodies[j];
        let r = a.position.distance_to(b.position);
        if r > 0.0 {
            sum -= GRAVITATIONAL_CONSTANT * a.mass() * b.mass() / r;
        }
    }
    sum
}

#[cfg(feature = "parallel")]
fn potential_energy(bodies: &[Body], massive: &[usize]) -> f64 {
    let rows: Vec<f64> = (0..massive.len())
        .into_par_iter()
        .map(|i| potential_row(bodies, massive, i))
        .collect();
    rows.into_iter().sum()
}

#[cfg(not(feature = "parallel"))]
fn potential_energy(bodies: &[Body], massive: &[usize]) -> f64 {
    (0..massive.len())
        .map(|i| potential_row(bodies, massive, i))
        .sum()
}

/// Total angular momentum Σ r × mv about the origin
pub fn angular_momentum(bodies: &[Body]) -> Vector3 {
    bodies
        .iter()
        .fold(Vector3::zero(), |acc, b| acc + b.position.cross(b.momentum()))
}

/// Total linear momentum Σ mv
pub fn linear_momentum(bodies: &[Body]) -> Vector3 {
    bodies.iter().fold(Vector3::zero(), |acc, b| acc + b.momentum())
}

/// Mass-weighted mean position, or the origin for an empty system
pub fn center_of_mass(bodies: &[Body]) -> Vector3 {
    let mut weighted = Vector3::zero();
    let mut total = 0.0;
    for body in bodies {
        weighted += body.position * body.mass();
        total += body.mass();
    }
    if total > 0.0 {
        weighted / total
    } else {
        weighted
    }
}

fn collision_row(bodies: &[Body], order: &[usize], i: usize, timestamp: f64) -> Vec<CollisionEvent> {
    let a = &bodies[order[i]];
    let mut events = Vec::new();
    for &j in &order[i + 1..] {
        let b = &bodies[j];
        let delta = b.position - a.position;
        if delta.length() < a.radius() + b.radius() {
            events.push(CollisionEvent {
                body_a: a.id().clone(),
                body_b: b.id().clone(),
                point: a.position + delta.safe_normalize() * a.radius(),
                relative_velocity: b.velocity - a.velocity,
                timestamp,
            });
        }
    }
    events
}

/// Every overlapping pair, visiting bodies in `order`
pub(crate) fn detect_collisions(bodies: &[Body], order: &[usize], timestamp: f64) -> Vec<CollisionEvent> {
    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<CollisionEvent>> = (0..order.len())
        .into_par_iter()
        .map(|i| collision_row(bodies, order, i, timestamp))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<CollisionEvent>> = (0..order.len())
        .map(|i| collision_row(bodies, order, i, timestamp))
        .collect();
    rows.into_iter().flatten().collect()
}

/// Massive body with the greatest m/d² among those whose SOI contains `position`
///
/// Ties keep the earlier body in `massive`.
pub(crate) fn dominant_body(bodies: &[Body], massive: &[usize], position: Vector3) -> Option<usize> {
    let mut best = None;
    let mut best_influence = 0.0;
    for &idx in massive {
        let other = &bodies[idx];
        let distance = other.position.distance_to(position);
        if distance < other.soi_radius() {
            let influence = other.mass() / (distance * distance);
            if influence > best_influence {
                best_influence = influence;
                best = Some(idx);
            }
        }
    }
    best
}
