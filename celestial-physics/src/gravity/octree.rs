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
//! Barnes–Hut octree stored as an index-addressed arena
//!
//! Node data lives in parallel vectors (structure of arrays) indexed by a
//! `u32` node id. Node 0 is the root. Each node owns a block of eight child
//! ids; [`NO_NODE`] marks an unallocated octant. Rebuilding clears the vectors
//! but keeps their capacity, so a steady-state tick allocates nothing.
//!
//! # Octants
//!
//! ```text
//! bit 0 (1): x >= center.x
//! bit 1 (2): y >= center.y
//! bit 2 (4): z >= center.z
//! ```
//!
//! # Aggregates
//!
//! Mass and center of mass are updated incrementally on every insertion
//! (weighted running average), never recomputed from children. The softening
//! of a node is the largest softening merged into it.
//!
//! A leaf holds one body. Its aggregates equal that body's mass, position and
//! softening, which is all that is needed to demote it when a second body
//! arrives.

use super::{point_mass_acceleration, MassSource, SINGULARITY_DISTANCE};
use crate::error::{PhysicsError, Result};
use crate::math::Vector3;

/// Sentinel for an unallocated child slot
const NO_NODE: u32 = u32::MAX;

/// Subdivision depth always allowed, whatever the bounds
const MIN_DEPTH_LIMIT: usize = 64;

/// Bounding cube half-size as a fraction of the sources' largest span
const BOUNDS_EXPANSION: f64 = 0.6;

/// Shape of the most recent build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    /// Allocated nodes
    pub nodes: usize,
    /// Nodes holding exactly one body
    pub leaves: usize,
    /// Depth of the deepest node (root is 0)
    pub max_depth: usize,
}

#[derive(Clone, Copy)]
struct Insert {
    body: usize,
    position: Vector3,
    mass: f64,
    softening: f64,
}

/// Depth at which a cube is narrower than [`SINGULARITY_DISTANCE`]
///
/// Any two bodies that far apart are split above this depth, so reaching it
/// means subdivision has stalled.
fn depth_limit(half_size: f64) -> usize {
    let levels = (half_size / SINGULARITY_DISTANCE).log2().ceil();
    if levels.is_finite() {
        (levels.max(0.0) as usize + 2).max(MIN_DEPTH_LIMIT)
    } else {
        MIN_DEPTH_LIMIT
    }
}

/// Spatial tree over massive bodies
///
/// # Example
///
/// ```
/// use celestial_physics::gravity::{MassSource, Octree};
/// use celestial_physics::math::Vector3;
///
/// let sources: Vec<MassSource> = (0..4)
///     .map(|i| MassSource {
///         body: i,
///         position: Vector3::new(i as f64 * 1e6, 0.0, 0.0),
///         mass: 1e20,
///         softening: 1e3,
///         radius: 1e3,
///     })
///     .collect();
///
/// let mut tree = Octree::new();
/// tree.build(&sources)?;
/// assert_eq!(tree.root_mass(), 4e20);
/// assert_eq!(tree.stats().leaves, 4);
/// # Ok::<(), celestial_physics::PhysicsError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Octree {
    center: Vec<Vector3>,
    half_size: Vec<f64>,
    mass: Vec<f64>,
    center_of_mass: Vec<Vector3>,
    softening: Vec<f64>,
    count: Vec<u32>,
    body: Vec<Option<usize>>,
    children: Vec<[u32; 8]>,
    max_depth: usize,
    depth_limit: usize,
}

impl Octree {
    /// Create an empty tree
    pub fn new() -> Self {
        Octree::default()
    }

    /// Drop all nodes, keeping allocated capacity
    pub fn clear(&mut self) {
        self.center.clear();
        self.half_size.clear();
        self.mass.clear();
        self.center_of_mass.clear();
        self.softening.clear();
        self.count.clear();
        self.body.clear();
        self.children.clear();
        self.max_depth = 0;
        self.depth_limit = MIN_DEPTH_LIMIT;
    }

    /// True when the tree holds no bodies
    pub fn is_empty(&self) -> bool {
        self.count.first().map_or(true, |&n| n == 0)
    }

    /// Number of allocated nodes
    pub fn node_count(&self) -> usize {
        self.center.len()
    }

    /// Rebuild from a snapshot of massive bodies
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Singularity`] if two sources coincide, in which
    /// case the tree is left partially built and must be rebuilt before use.
    pub fn build(&mut self, sources: &[MassSource]) -> Result<()> {
        self.clear();
        if sources.is_empty() {
            return Ok(());
        }

        let mut min = sources[0].position;
        let mut max = sources[0].position;
        for source in &sources[1..] {
            min = min.min(source.position);
            max = max.max(source.position);
        }
        let span = max - min;
        let mut half_size = span.x.max(span.y).max(span.z) * BOUNDS_EXPANSION;
        if !(half_size > 0.0) {
            half_size = 1.0;
        }

        self.depth_limit = depth_limit(half_size);
        let root = self.push_node((min + max) * 0.5, half_size);
        for source in sources {
            let item = Insert {
                body: source.body,
                position: source.position,
                mass: source.mass,
                softening: source.softening,
            };
            self.insert(root, item, 0)?;
        }
        Ok(())
    }

    fn push_node(&mut self, center: Vector3, half_size: f64) -> u32 {
        let id = self.center.len() as u32;
        self.center.push(center);
        self.half_size.push(half_size);
        self.mass.push(0.0);
        self.center_of_mass.push(Vector3::zero());
        self.softening.push(0.0);
        self.count.push(0);
        self.body.push(None);
        self.children.push([NO_NODE; 8]);
        id
    }

    fn octant(&self, node: usize, position: Vector3) -> usize {
        let c = self.center[node];
        let mut octant = 0;
        if position.x >= c.x {
            octant |= 1;
        }
        if position.y >= c.y {
            octant |= 2;
        }
        if position.z >= c.z {
            octant |= 4;
        }
        octant
    }

    fn child_for(&mut self, node: usize, position: Vector3) -> u32 {
        let octant = self.octant(node, position);
        let existing = self.children[node][octant];
        if existing != NO_NODE {
            return existing;
        }

        let quarter = self.half_size[node] * 0.5;
        let pick = |bit: usize| if octant & bit != 0 { quarter } else { -quarter };
        let center = self.center[node] + Vector3::new(pick(1), pick(2), pick(4));
        let child = self.push_node(center, quarter);
        self.children[node][octant] = child;
        child
    }

    fn insert(&mut self, node: u32, item: Insert, depth: usize) -> Result<()> {
        self.max_depth = self.max_depth.max(depth);
        let n = node as usize;

        if self.count[n] == 0 {
            self.body[n] = Some(item.body);
            self.mass[n] = item.mass;
            self.center_of_mass[n] = item.position;
            self.softening[n] = item.softening;
            self.count[n] = 1;
            return Ok(());
        }

        if let Some(existing) = self.body[n].take() {
            let existing_position = self.center_of_mass[n];
            let separation = existing_position.distance_to(item.position);
            // Past the limit the cube cannot split them, usually because
            // child centers no longer move at this coordinate magnitude
            if separation < SINGULARITY_DISTANCE || depth >= self.depth_limit {
                self.body[n] = Some(existing);
                return Err(PhysicsError::Singularity {
                    position: item.position,
                    distance: separation,
                });
            }
            let demoted = Insert {
                body: existing,
                position: existing_position,
                mass: self.mass[n],
                softening: self.softening[n],
            };
            let child = self.child_for(n, demoted.position);
            self.insert(child, demoted, depth + 1)?;
        }

        let child = self.child_for(n, item.position);
        self.insert(child, item, depth + 1)?;

        let total = self.mass[n] + item.mass;
        self.center_of_mass[n] =
            (self.center_of_mass[n] * self.mass[n] + item.position * item.mass) / total;
        self.mass[n] = total;
        self.softening[n] = self.softening[n].max(item.softening);
        self.count[n] += 1;
        Ok(())
    }

    /// Approximate acceleration at `position` with opening angle `theta`
    ///
    /// The body at registry index `exclude` contributes nothing when it is
    /// reached as a leaf. `theta = 0` opens every internal node and gives the
    /// same result as direct summation.
    pub fn acceleration(&self, exclude: Option<usize>, position: Vector3, theta: f64) -> Result<Vector3> {
        if self.is_empty() {
            return Ok(Vector3::zero());
        }
        self.accumulate(0, exclude, position, theta)
    }

    fn accumulate(&self, node: usize, exclude: Option<usize>, position: Vector3, theta: f64) -> Result<Vector3> {
        if self.count[node] == 0 {
            return Ok(Vector3::zero());
        }
        let leaf = self.body[node];
        if leaf.is_some() && leaf == exclude {
            return Ok(Vector3::zero());
        }

        let distance = self.center_of_mass[node].distance_to(position);
        let ratio = 2.0 * self.half_size[node] / distance;
        if leaf.is_some() || ratio < theta {
            return point_mass_acceleration(
                position,
                self.center_of_mass[node],
                self.mass[node],
                self.softening[node],
            );
        }

        let mut total = Vector3::zero();
        for &child in &self.children[node] {
            if child != NO_NODE {
                total += self.accumulate(child as usize, exclude, position, theta)?;
            }
        }
        Ok(total)
    }

    /// Registry indices of bodies within `radius` of `point`
    pub fn bodies_within(&self, point: Vector3, radius: f64) -> Vec<usize> {
        let mut found = Vec::new();
        if self.is_empty() {
            return found;
        }

        let half_diagonal = 3.0_f64.sqrt();
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            if self.count[node] == 0 {
                continue;
            }
            if point.distance_to(self.center[node]) - self.half_size[node] * half_diagonal > radius {
                continue;
            }
            if let Some(body) = self.body[node] {
                if point.distance_to(self.center_of_mass[node]) <= radius {
                    found.push(body);
                }
                continue;
            }
            stack.extend(
                self.children[node]
                    .iter()
                    .filter(|&&child| child != NO_NODE)
                    .map(|&child| child as usize),
            );
        }
        found.sort_unstable();
        found
    }

    /// Total mass of all inserted bodies
    pub fn root_mass(&self) -> f64 {
        self.mass.first().copied().unwrap_or(0.0)
    }

    /// Center of mass of all inserted bodies
    pub fn root_center_of_mass(&self) -> Option<Vector3> {
        if self.is_empty() {
            None
        } else {
            Some(self.center_of_mass[0])
        }
    }

    /// Bounding cube of the root as (center, half-size)
    pub fn bounds(&self) -> Option<(Vector3, f64)> {
        if self.center.is_empty() {
            None
        } else {
            Some((self.center[0], self.half_size[0]))
        }
    }

    /// Node, leaf and depth counts for the current build
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            nodes: self.node_count(),
            leaves: self.body.iter().filter(|b| b.is_some()).count(),
            max_depth: self.max_depth,
        }
    }
}
