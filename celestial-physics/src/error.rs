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
//! Error types for the simulation
//!
//! Every error in this enum is a programming or configuration error: the
//! engine reports it immediately and never retries. Conditions the engine can
//! recover from (accumulator overflow, an adaptive step stuck at its floor)
//! are logged instead and never surface here.

use crate::body::BodyId;
use crate::gravity::GravityMethod;
use crate::math::Vector3;
use crate::network::WireError;
use thiserror::Error;

/// Errors raised by the physics subsystem
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// A body with this id is already registered
    #[error("body with id '{0}' already exists")]
    DuplicateBody(BodyId),

    /// A body definition violates a physical invariant
    #[error("invalid body '{id}': {reason}")]
    InvalidBody {
        /// Offending body
        id: BodyId,
        /// Which invariant failed
        reason: String,
    },

    /// Engine configuration is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Integrator name did not match any known scheme
    #[error("unknown integrator: {0}")]
    UnknownIntegrator(String),

    /// Gravity method is reserved but not implemented
    #[error("gravity method {0:?} is not supported")]
    UnsupportedGravityMethod(GravityMethod),

    /// A force evaluation landed on top of a point mass
    #[error("gravitational singularity at {position}: separation {distance:e} m")]
    Singularity {
        /// Position being evaluated
        position: Vector3,
        /// Separation from the offending mass
        distance: f64,
    },

    /// An integrator's local error estimate stopped being finite
    #[error("integration of body '{body}' diverged at t = {time} s")]
    Diverged {
        /// Body being integrated
        body: BodyId,
        /// Start of the failing substep
        time: f64,
    },

    /// Attempted to normalize a zero-length vector
    #[error("cannot normalize a zero-length vector")]
    ZeroLengthVector,

    /// Advancing a specific body failed; earlier bodies in the tick stay advanced
    #[error("step failed for body '{body}': {source}")]
    StepFailed {
        /// Body being integrated when the failure happened
        body: BodyId,
        /// Underlying failure
        #[source]
        source: Box<PhysicsError>,
    },

    /// World file was written by an incompatible format version
    #[error("world format {found} is incompatible with supported format {supported}")]
    IncompatibleWorld {
        /// Version found in the world file
        found: String,
        /// Version this build reads
        supported: String,
    },

    /// Binary body-state buffer could not be written or is truncated
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[from] WireError),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, PhysicsError>;

impl PhysicsError {
    /// Unwrap `StepFailed` layers and return the innermost cause
    pub fn root_cause(&self) -> &PhysicsError {
        match self {
            PhysicsError::StepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_step_failures() {
        let err = PhysicsError::StepFailed {
            body: BodyId::from("probe"),
            source: Box::new(PhysicsError::Singularity {
                position: Vector3::zero(),
                distance: 0.0,
            }),
        };
        assert!(matches!(err.root_cause(), PhysicsError::Singularity { .. }));
        assert!(err.to_string().contains("probe"));
    }

    #[test]
    fn test_messages_name_the_body() {
        let err = PhysicsError::DuplicateBody(BodyId::from("earth"));
        assert_eq!(err.to_string(), "body with id 'earth' already exists");
    }
}
