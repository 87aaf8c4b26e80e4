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
//! Two-body orbital mechanics helpers and reference constants
//!
//! # References
//!
//! - Bate, R. R., Mueller, D. D., & White, J. E. (1971). "Fundamentals of
//!   Astrodynamics". Dover.
//! - IAU 2012 Resolution B2 for the astronomical unit.

use std::f64::consts::TAU;

/// Astronomical unit in m (IAU 2012, exact)
pub const ASTRONOMICAL_UNIT: f64 = 1.495978707e11;

/// Sidereal year in s
pub const EARTH_ORBITAL_PERIOD: f64 = 31_558_149.504;

/// Mass of the Sun in kg
pub const SOLAR_MASS: f64 = 1.98892e30;

/// Mass of the Earth in kg
pub const EARTH_MASS: f64 = 5.9722e24;

/// Mean radius of the Earth in m
pub const EARTH_RADIUS: f64 = 6.371e6;

/// Laplace sphere-of-influence radius
///
/// **r_SOI = a · (m / M)^(2/5)**
///
/// where `a` is the separation from the parent, `m` the body mass and `M` the
/// parent mass.
pub fn sphere_of_influence(separation: f64, mass: f64, parent_mass: f64) -> f64 {
    separation * (mass / parent_mass).powf(0.4)
}

/// Speed of a circular orbit of radius `r` around a body with parameter `mu`
pub fn circular_orbital_velocity(mu: f64, r: f64) -> f64 {
    (mu / r).sqrt()
}

/// Period of an orbit with semi-major axis `a` (Kepler's third law)
pub fn orbital_period(mu: f64, semi_major_axis: f64) -> f64 {
    TAU * (semi_major_axis.powi(3) / mu).sqrt()
}

/// Specific orbital energy of a state relative to the central body
///
/// Negative for bound orbits.
pub fn specific_orbital_energy(mu: f64, r: f64, speed: f64) -> f64 {
    0.5 * speed * speed - mu / r
}

/// Semi-major axis from the specific orbital energy (vis-viva)
pub fn semi_major_axis(mu: f64, r: f64, speed: f64) -> f64 {
    -mu / (2.0 * specific_orbital_energy(mu, r, speed))
}
