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
//! Direct O(n²) summation

use super::{point_mass_acceleration, MassSource};
use crate::error::Result;
use crate::math::Vector3;

/// Sum the softened pull of every source on `position`
///
/// The source whose `body` index equals `exclude` is skipped, so a body never
/// attracts itself. Each term uses the softening of its source.
///
/// # Errors
///
/// Returns [`crate::PhysicsError::Singularity`] if `position` coincides with
/// any other source.
pub fn direct_acceleration(
    sources: &[MassSource],
    exclude: Option<usize>,
    position: Vector3,
) -> Result<Vector3> {
    let mut total = Vector3::zero();
    for source in sources {
        if Some(source.body) == exclude {
            continue;
        }
        total += point_mass_acceleration(position, source.position, source.mass, source.softening)?;
    }
    Ok(total)
}
