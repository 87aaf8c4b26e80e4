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
//! Bounded snapshot history for interpolation

use crate::math::{Quaternion, Vector3};
use std::collections::VecDeque;

/// Snapshots kept per body unless configured otherwise
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Kinematic state of a body at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    /// Simulation time in s
    pub time: f64,
    /// Position in m
    pub position: Vector3,
    /// Velocity in m/s
    pub velocity: Vector3,
    /// Orientation
    pub orientation: Quaternion,
    /// Spin rate in rad/s
    pub angular_velocity: f64,
}

/// Ring of the most recent snapshots, oldest first
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    depth: usize,
    snapshots: VecDeque<BodySnapshot>,
}

impl SnapshotHistory {
    /// Create an empty history retaining at most `depth` snapshots
    pub fn new(depth: usize) -> Self {
        SnapshotHistory {
            depth,
            snapshots: VecDeque::with_capacity(depth),
        }
    }

    /// Maximum retained snapshots
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Change the depth, dropping the oldest snapshots if needed
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        while self.snapshots.len() > depth {
            self.snapshots.pop_front();
        }
    }

    /// Append a snapshot, evicting the oldest when full
    pub fn push(&mut self, snapshot: BodySnapshot) {
        if self.depth == 0 {
            return;
        }
        if self.snapshots.len() == self.depth {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<&BodySnapshot> {
        self.snapshots.back()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &BodySnapshot> {
        self.snapshots.iter()
    }

    /// Drop every snapshot
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Interpolate between the two snapshots bracketing `time`
    pub fn interpolate(&self, time: f64) -> Option<BodySnapshot> {
        if self.snapshots.len() < 2 {
            return None;
        }

        for i in 0..self.snapshots.len() - 1 {
            let a = &self.snapshots[i];
            let b = &self.snapshots[i + 1];
            if a.time <= time && time <= b.time {
                let span = b.time - a.time;
                let alpha = if span > 0.0 { (time - a.time) / span } else { 0.0 };
                return Some(BodySnapshot {
                    time,
                    position: a.position.lerp(b.position, alpha),
                    velocity: a.velocity.lerp(b.velocity, alpha),
                    orientation: a.orientation.slerp(b.orientation, alpha),
                    angular_velocity: a.angular_velocity
                        + (b.angular_velocity - a.angular_velocity) * alpha,
                });
            }
        }

        self.latest().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(time: f64, x: f64) -> BodySnapshot {
        BodySnapshot {
            time,
            position: Vector3::new(x, 0.0, 0.0),
            velocity: Vector3::zero(),
            orientation: Quaternion::identity(),
            angular_velocity: x,
        }
    }

    #[test]
    fn test_evicts_oldest() {
        let mut history = SnapshotHistory::new(3);
        for i in 0..5 {
            history.push(snap(i as f64, i as f64));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().next().map(|s| s.time), Some(2.0));
        assert_eq!(history.latest().map(|s| s.time), Some(4.0));
    }

    #[test]
    fn test_interpolate_needs_two_snapshots() {
        let mut history = SnapshotHistory::new(10);
        assert!(history.interpolate(0.0).is_none());
        history.push(snap(0.0, 0.0));
        assert!(history.interpolate(0.0).is_none());
    }

    #[test]
    fn test_interpolate_between_and_outside() {
        let mut history = SnapshotHistory::new(10);
        history.push(snap(0.0, 0.0));
        history.push(snap(1.0, 10.0));
        history.push(snap(2.0, 30.0));

        let mid = history.interpolate(1.5).expect("bracketed");
        assert_eq!(mid.position.x, 20.0);
        assert_eq!(mid.angular_velocity, 20.0);

        let after = history.interpolate(5.0).expect("latest");
        assert_eq!(after.time, 2.0);
        let before = history.interpolate(-1.0).expect("latest");
        assert_eq!(before.time, 2.0);
    }

    #[test]
    fn test_shrinking_depth_drops_oldest() {
        let mut history = SnapshotHistory::new(5);
        for i in 0..5 {
            history.push(snap(i as f64, 0.0));
        }
        history.set_depth(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().next().map(|s| s.time), Some(3.0));
    }
}
