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
//! Fixed-node Gauss–Radau predictor-corrector
//!
//! Sweeps the eight Gauss–Radau spacings of the 15th-order IAS15 scheme in
//! sequence. Between consecutive nodes it takes an Euler predictor followed
//! by a trapezoidal corrector; the acceleration at the last node becomes the
//! body's acceleration.
//!
//! ```text
//! h_sub = (h[i] - h[i-1]) * dt
//! x'    = x + v*h_sub
//! v'    = v + a*h_sub
//! a'    = accel(x', v', t + h[i]*dt)
//! x    += (v + v')*h_sub/2
//! v    += (a + a')*h_sub/2
//! ```
//!
//! The node set is used as-is: the sweep ends at the last node `h[7]`, and
//! there is no step-size control. Output depends on that exact schedule.
//!
//! # References
//!
//! - Everhart, E. (1985). An efficient integrator that uses Gauss-Radau
//!   spacings. Dynamics of Comets: Their Origin and Evolution, 185-202.
//! - Rein, H., & Spiegel, D. S. (2015). IAS15: a fast, adaptive, high-order
//!   integrator for gravitational dynamics. MNRAS, 446(2), 1424-1437.

use crate::body::Body;
use crate::error::Result;
use crate::math::Vector3;

/// Gauss–Radau spacing fractions, starting at zero
pub const GAUSS_RADAU_NODES: [f64; 8] = [
    0.0,
    0.056_262_560_536_922_146_465_652_2,
    0.180_240_691_736_892_364_987_579_9,
    0.352_624_717_113_169_637_373_907_8,
    0.547_153_626_330_555_383_001_448_6,
    0.734_210_177_215_410_541_053_152_3,
    0.885_320_946_839_095_768_090_359_8,
    0.977_520_613_561_287_501_891_174_5,
];

pub(super) fn step<F>(body: &mut Body, dt: f64, time: f64, mut accel: F) -> Result<()>
where
    F: FnMut(&Body, Vector3, Vector3, f64) -> Result<Vector3>,
{
    let mut x = body.position;
    let mut v = body.velocity;
    let mut a = accel(body, x, v, time)?;

    for pair in GAUSS_RADAU_NODES.windows(2) {
        let (h_prev, h) = (pair[0], pair[1]);
        let sub_dt = (h - h_prev) * dt;

        let x_pred = x + v * sub_dt;
        let v_pred = v + a * sub_dt;
        let a_pred = accel(body, x_pred, v_pred, time + h * dt)?;

        x += (v + v_pred) * (0.5 * sub_dt);
        v += (a + a_pred) * (0.5 * sub_dt);
        a = a_pred;
    }

    body.position = x;
    body.velocity = v;
    body.acceleration = a;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Integrator, IntegratorKind};
    use super::*;

    #[test]
    fn test_nodes_are_increasing_in_unit_interval() {
        assert_eq!(GAUSS_RADAU_NODES[0], 0.0);
        for pair in GAUSS_RADAU_NODES.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!(GAUSS_RADAU_NODES[7] < 1.0);
    }

    #[test]
    fn test_eight_evaluations_at_node_times() {
        let mut integrator = Integrator::new(IntegratorKind::GaussRadau);
        let mut body = particle(Vector3::zero(), Vector3::new(1.0, 0.0, 0.0));
        let mut times = Vec::new();
        integrator
            .step(&mut body, 2.0, 10.0, |_, _, _, t| {
                times.push(t);
                Ok(Vector3::zero())
            })
            .expect("step");
        assert_eq!(times.len(), 8);
        for (t, h) in times.iter().zip(GAUSS_RADAU_NODES) {
            assert!((t - (10.0 + 2.0 * h)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_acceleration_over_the_node_span() {
        let mut integrator = Integrator::new(IntegratorKind::GaussRadau);
        let g = Vector3::new(0.0, -2.0, 0.0);
        let mut body = particle(Vector3::zero(), Vector3::new(3.0, 4.0, 0.0));
        let dt = 1.0;
        integrator
            .step(&mut body, dt, 0.0, |_, _, _, _| Ok(g))
            .expect("step");

        // Each sub-interval is exact for constant acceleration
        let span = GAUSS_RADAU_NODES[7] * dt;
        assert!((body.position.x - 3.0 * span).abs() < 1e-12);
        assert!((body.position.y - (4.0 * span - span * span)).abs() < 1e-12);
        assert!((body.velocity.y - (4.0 - 2.0 * span)).abs() < 1e-12);
        assert_eq!(body.acceleration, g);
    }

    #[test]
    fn test_repeatable_output() {
        let run = || {
            let mut integrator = Integrator::new(IntegratorKind::GaussRadau);
            let mut body = particle(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
            for i in 0..50 {
                integrator
                    .step(&mut body, 0.01, i as f64 * 0.01, unit_kepler)
                    .expect("step");
            }
            body.position
        };
        assert_eq!(run(), run());
    }
}
