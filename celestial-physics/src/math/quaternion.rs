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
//! Unit quaternion for body orientation
//!
//! Composition order is significant and kept explicit:
//!
//! ```text
//! a.multiply(b)    = a ∘ b
//! a.premultiply(b) = b ∘ a
//! ```

use super::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Rotation quaternion `(x, y, z, w)` with `w` as the scalar part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// i component
    pub x: f64,
    /// j component
    pub y: f64,
    /// k component
    pub z: f64,
    /// Scalar component
    pub w: f64,
}

impl Quaternion {
    /// Create a quaternion from raw components (not normalized)
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quaternion { x, y, z, w }
    }

    /// The identity rotation
    pub const fn identity() -> Self {
        Quaternion::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation of `angle` radians about a unit `axis`
    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let half = angle * 0.5;
        let s = half.sin();
        Quaternion::new(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Hamilton product `self ∘ other`
    pub fn multiply(self, other: Quaternion) -> Quaternion {
        let (ax, ay, az, aw) = (self.x, self.y, self.z, self.w);
        let (bx, by, bz, bw) = (other.x, other.y, other.z, other.w);
        Quaternion::new(
            ax * bw + aw * bx + ay * bz - az * by,
            ay * bw + aw * by + az * bx - ax * bz,
            az * bw + aw * bz + ax * by - ay * bx,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Hamilton product `other ∘ self`
    pub fn premultiply(self, other: Quaternion) -> Quaternion {
        other.multiply(self)
    }

    /// Conjugate; the inverse for unit quaternions
    pub fn conjugate(self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Four-component dot product
    pub fn dot(self, other: Quaternion) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Squared norm
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Norm
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Scale to unit norm; a zero quaternion becomes the identity
    pub fn normalize(self) -> Quaternion {
        let len = self.length();
        if len == 0.0 {
            return Quaternion::identity();
        }
        let inv = 1.0 / len;
        Quaternion::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
    }

    /// Rotate a vector with the sandwich product `q · v · q⁻¹`
    pub fn rotate_vector(self, v: Vector3) -> Vector3 {
        let (qx, qy, qz, qw) = (self.x, self.y, self.z, self.w);

        // q * v
        let ix = qw * v.x + qy * v.z - qz * v.y;
        let iy = qw * v.y + qz * v.x - qx * v.z;
        let iz = qw * v.z + qx * v.y - qy * v.x;
        let iw = -qx * v.x - qy * v.y - qz * v.z;

        // (q * v) * q⁻¹
        Vector3::new(
            ix * qw + iw * -qx + iy * -qz - iz * -qy,
            iy * qw + iw * -qy + iz * -qx - ix * -qz,
            iz * qw + iw * -qz + ix * -qy - iy * -qx,
        )
    }

    /// Spherical linear interpolation toward `other`
    ///
    /// Takes the shorter arc: when the operands point into opposite
    /// hemispheres `other` is negated first. Nearly parallel inputs fall back
    /// to a normalized linear blend.
    pub fn slerp(self, other: Quaternion, t: f64) -> Quaternion {
        if t == 0.0 {
            return self;
        }
        if t == 1.0 {
            return other;
        }

        let mut cos_half = self.dot(other);
        let mut target = other;
        if cos_half < 0.0 {
            target = Quaternion::new(-other.x, -other.y, -other.z, -other.w);
            cos_half = -cos_half;
        }

        if cos_half >= 1.0 {
            return self;
        }

        let sin_sq = 1.0 - cos_half * cos_half;
        if sin_sq <= f64::EPSILON {
            let s = 1.0 - t;
            return Quaternion::new(
                s * self.x + t * target.x,
                s * self.y + t * target.y,
                s * self.z + t * target.z,
                s * self.w + t * target.w,
            )
            .normalize();
        }

        let sin_half = sin_sq.sqrt();
        let half_theta = sin_half.atan2(cos_half);
        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half;
        let ratio_b = (t * half_theta).sin() / sin_half;

        Quaternion::new(
            self.x * ratio_a + target.x * ratio_b,
            self.y * ratio_a + target.y * ratio_b,
            self.z * ratio_a + target.z * ratio_b,
            self.w * ratio_a + target.w * ratio_b,
        )
    }

    /// Rotation angle in radians, in `[0, 2π]`
    pub fn angle(self) -> f64 {
        2.0 * self.w.clamp(-1.0, 1.0).acos()
    }

    /// True when every component is finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Components as `[x, y, z, w]`
    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Build from `[x, y, z, w]`
    pub fn from_array(arr: [f64; 4]) -> Self {
        Quaternion::new(arr[0], arr[1], arr[2], arr[3])
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::identity()
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    /// Same as [`Quaternion::multiply`]
    fn mul(self, rhs: Quaternion) -> Quaternion {
        self.multiply(rhs)
    }
}
