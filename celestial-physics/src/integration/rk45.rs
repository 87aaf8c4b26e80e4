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
//! Adaptive Dormand–Prince 5(4) integrator
//!
//! The requested interval is consumed in one or more accepted substeps. Each
//! trial substep evaluates the seven-stage Dormand–Prince tableau, compares
//! the fifth- and fourth-order solutions, and uses the difference as the
//! local error estimate:
//!
//! ```text
//! error = max(|x5 - x4|, |v5 - v4|)
//! scale = clamp(0.9 * (tol / error)^(1/5), 0.2, 5.0)
//! next  = clamp(dt * scale, min_dt, max_dt)
//! ```
//!
//! A trial is accepted when `error <= tol` or the trial substep is already at
//! the `min_dt` floor. The floor case is logged. A non-finite error fails the
//! step with [`PhysicsError::Diverged`].
//!
//! # References
//!
//! - Dormand, J. R., & Prince, P. J. (1980). A family of embedded Runge-Kutta
//!   formulae. Journal of Computational and Applied Mathematics, 6(1), 19-26.
//! - Hairer, E., Nørsett, S. P., & Wanner, G. (1993). Solving Ordinary
//!   Differential Equations I (2nd ed.). Springer. Section II.5.

use super::AdaptiveSettings;
use crate::body::Body;
use crate::error::{PhysicsError, Result};
use crate::math::Vector3;
use log::warn;

/// Stage time fractions
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

/// Stage coupling coefficients (row i uses the first i entries)
const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

/// Fifth-order weights
const B5: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];

/// Embedded fourth-order weights
const B4: [f64; 7] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

/// Remaining time below which the interval counts as consumed
const REMAINING_EPSILON: f64 = 1e-12;

struct Trial {
    position: Vector3,
    velocity: Vector3,
    acceleration: Vector3,
    error: f64,
}

fn trial<F>(body: &Body, x0: Vector3, v0: Vector3, dt: f64, time: f64, accel: &mut F) -> Result<Trial>
where
    F: FnMut(&Body, Vector3, Vector3, f64) -> Result<Vector3>,
{
    let mut k = [Vector3::zero(); 7];
    let mut kv = [Vector3::zero(); 7];

    for i in 0..7 {
        let mut xi = x0;
        let mut vi = v0;
        for j in 0..i {
            let aij = A[i][j] * dt;
            xi += kv[j] * aij;
            vi += k[j] * aij;
        }
        k[i] = accel(body, xi, vi, time + C[i] * dt)?;
        kv[i] = vi;
    }

    let mut x5 = x0;
    let mut v5 = v0;
    let mut x4 = x0;
    let mut v4 = v0;
    for i in 0..7 {
        x5 += kv[i] * (B5[i] * dt);
        v5 += k[i] * (B5[i] * dt);
        x4 += kv[i] * (B4[i] * dt);
        v4 += k[i] * (B4[i] * dt);
    }

    let error = (x5 - x4).length().max((v5 - v4).length());
    Ok(Trial {
        position: x5,
        velocity: v5,
        acceleration: k[6],
        error,
    })
}

fn step_scale(tolerance: f64, error: f64) -> f64 {
    if error < 1e-15 {
        5.0
    } else {
        (0.9 * (tolerance / error).powf(0.2)).clamp(0.2, 5.0)
    }
}

pub(super) fn step<F>(
    settings: &AdaptiveSettings,
    body: &mut Body,
    dt: f64,
    time: f64,
    mut accel: F,
) -> Result<()>
where
    F: FnMut(&Body, Vector3, Vector3, f64) -> Result<Vector3>,
{
    let mut x = body.position;
    let mut v = body.velocity;
    let mut a = body.acceleration;
    let mut t = time;
    let mut remaining = dt;
    let mut current_dt = dt.min(settings.max_dt);

    while remaining > REMAINING_EPSILON {
        current_dt = current_dt.min(remaining);
        let result = trial(body, x, v, current_dt, t, &mut accel)?;
        if !result.error.is_finite() {
            return Err(PhysicsError::Diverged {
                body: body.id().clone(),
                time: t,
            });
        }

        let at_floor = current_dt <= settings.min_dt;
        if result.error <= settings.tolerance || at_floor {
            if result.error > settings.tolerance {
                warn!(
                    "RK45 accepted substep of {:e} s for body '{}' at the min_dt floor with error {:e} > tolerance {:e}",
                    current_dt,
                    body.id(),
                    result.error,
                    settings.tolerance
                );
            }
            x = result.position;
            v = result.velocity;
            a = result.acceleration;
            remaining -= current_dt;
            t += current_dt;
        }

        current_dt = (current_dt * step_scale(settings.tolerance, result.error))
            .clamp(settings.min_dt, settings.max_dt);
    }

    body.position = x;
    body.velocity = v;
    body.acceleration = a;
    Ok(())
}
