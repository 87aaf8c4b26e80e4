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
//! Three-component double-precision vector

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// 3D vector with double-precision components
///
/// Used for positions (m), velocities (m/s) and accelerations (m/s²).
///
/// # Examples
///
/// ```
/// use celestial_physics::math::Vector3;
///
/// let a = Vector3::new(1.0, 2.0, 3.0);
/// let b = Vector3::new(4.0, 5.0, 6.0);
/// assert_eq!(a.dot(b), 32.0);
/// assert_eq!((a + b).x, 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vector3 {
    /// Create a vector from components
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    /// The zero vector
    pub const fn zero() -> Self {
        Vector3::new(0.0, 0.0, 0.0)
    }

    /// Unit vector along +X
    pub const fn unit_x() -> Self {
        Vector3::new(1.0, 0.0, 0.0)
    }

    /// Unit vector along +Y
    pub const fn unit_y() -> Self {
        Vector3::new(0.0, 1.0, 0.0)
    }

    /// Unit vector along +Z
    pub const fn unit_z() -> Self {
        Vector3::new(0.0, 0.0, 1.0)
    }

    /// Dot product
    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product `self × other`
    pub fn cross(self, other: Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared Euclidean length
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Euclidean length
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    pub fn distance_to(self, other: Vector3) -> f64 {
        (other - self).length()
    }

    /// Squared distance to another point
    pub fn distance_squared_to(self, other: Vector3) -> f64 {
        (other - self).length_squared()
    }

    /// Unit vector in the same direction
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::ZeroLengthVector`] when the length is zero.
    pub fn normalize(self) -> Result<Vector3> {
        let len = self.length();
        if len == 0.0 {
            return Err(PhysicsError::ZeroLengthVector);
        }
        Ok(self / len)
    }

    /// Unit vector in the same direction, or zero for a zero-length input
    ///
    /// This is the variant used on hot paths where a zero direction is a
    /// meaningful answer (coincident contact points, for instance).
    pub fn safe_normalize(self) -> Vector3 {
        let len = self.length();
        if len == 0.0 {
            Vector3::zero()
        } else {
            self / len
        }
    }

    /// Linear interpolation: `self + (other - self) * alpha`
    pub fn lerp(self, other: Vector3, alpha: f64) -> Vector3 {
        Vector3::new(
            self.x + (other.x - self.x) * alpha,
            self.y + (other.y - self.y) * alpha,
            self.z + (other.z - self.z) * alpha,
        )
    }

    /// Component-wise minimum
    pub fn min(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum
    pub fn max(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// True when every component is finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Components as an array
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Build from an array
    pub fn from_array(arr: [f64; 3]) -> Self {
        Vector3::new(arr[0], arr[1], arr[2])
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:e}, {:e}, {:e})", self.x, self.y, self.z)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Vector3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Vector3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, s: f64) -> Vector3 {
        Vector3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        v * self
    }
}

impl MulAssign<f64> for Vector3 {
    fn mul_assign(&mut self, s: f64) {
        self.x *= s;
        self.y *= s;
        self.z *= s;
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, s: f64) -> Vector3 {
        Vector3::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}
