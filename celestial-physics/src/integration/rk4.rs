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
//! Runge-Kutta 4th order (RK4) integrator implementation
//!
//! # Algorithm
//!
//! For our second-order system (position and velocity):
//!
//! ```text
//! k1_v = a(x, v, t)                                k1_x = v
//! k2_v = a(x + k1_x*dt/2, v + k1_v*dt/2, t + dt/2) k2_x = v + k1_v*dt/2
//! k3_v = a(x + k2_x*dt/2, v + k2_v*dt/2, t + dt/2) k3_x = v + k2_v*dt/2
//! k4_v = a(x + k3_x*dt,   v + k3_v*dt,   t + dt)   k4_x = v + k3_v*dt
//! x(t + dt) = x + (k1_x + 2*k2_x + 2*k3_x + k4_x)*dt/6
//! v(t + dt) = v + (k1_v + 2*k2_v + 2*k3_v + k4_v)*dt/6
//! ```
//!
//! # Properties
//!
//! - **Fourth-order accurate**: Local error O(dt⁵), global error O(dt⁴)
//! - **Not symplectic**: Energy drifts secularly over long simulations
//! - **Stateless**: Nothing is carried between calls
//!
//! # References
//!
//! - Butcher, J. C. (2016). Numerical Methods for Ordinary Differential Equations
//!   (3rd ed.). Wiley. Chapter 3.
//! - Press, W. H., Teukolsky, S. A., Vetterling, W. T., & Flannery, B. P. (2007).
//!   Numerical Recipes: The Art of Scientific Computing (3rd ed.). Cambridge
//!   University Press. Section 17.1.

use crate::body::Body;
use crate::error::Result;
use crate::math::Vector3;

pub(super) fn step<F>(body: &mut Body, dt: f64, time: f64, mut accel: F) -> Result<()>
where
    F: FnMut(&Body, Vector3, Vector3, f64) -> Result<Vector3>,
{
    let x = body.position;
    let v = body.velocity;
    let half_dt = 0.5 * dt;

    let k1_x = v;
    let k1_v = accel(body, x, v, time)?;

    let k2_x = v + k1_v * half_dt;
    let k2_v = accel(body, x + k1_x * half_dt, k2_x, time + half_dt)?;

    let k3_x = v + k2_v * half_dt;
    let k3_v = accel(body, x + k2_x * half_dt, k3_x, time + half_dt)?;

    let k4_x = v + k3_v * dt;
    let k4_v = accel(body, x + k3_x * dt, k4_x, time + dt)?;

    let sixth = dt / 6.0;
    body.position = x + (k1_x + k2_x * 2.0 + k3_x * 2.0 + k4_x) * sixth;
    body.velocity = v + (k1_v + k2_v * 2.0 + k3_v * 2.0 + k4_v) * sixth;
    body.acceleration = k4_v;
    Ok(())
}
