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
//! World files
//!
//! A [`WorldState`] is the serializable description of a whole simulation:
//! a list of body definitions plus a little metadata. Every world carries a
//! semantic `format_version`; a world is loadable when its version is
//! compatible with [`WORLD_FORMAT_VERSION`]:
//!
//! - Major versions must match
//! - For 1.x and later, the world's minor version must be <= ours
//! - For 0.x, minor versions must match exactly (pre-1.0 minors are breaking)

use crate::body::BodyDefinition;
use crate::error::{PhysicsError, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

/// World format version written by this build
pub const WORLD_FORMAT_VERSION: &str = "1.0.0";

fn current_format_version() -> String {
    WORLD_FORMAT_VERSION.to_string()
}

/// When and at which tick a world was exported
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldMetadata {
    /// Simulation time at export
    pub export_time: f64,
    /// Tick count at export
    pub export_tick: u64,
}

/// Serializable simulation contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Format version; the current version is assumed when omitted
    #[serde(default = "current_format_version")]
    pub format_version: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Seed used to generate the world, if any
    #[serde(default)]
    pub seed: u64,
    /// Bodies in registry order
    pub bodies: Vec<BodyDefinition>,
    /// Export bookkeeping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<WorldMetadata>,
}

impl WorldState {
    /// Empty world at the current format version
    pub fn new(name: impl Into<String>) -> Self {
        WorldState {
            format_version: current_format_version(),
            name: name.into(),
            description: String::new(),
            seed: 0,
            bodies: Vec::new(),
            metadata: None,
        }
    }

    /// Append a body definition
    pub fn with_body(mut self, body: BodyDefinition) -> Self {
        self.bodies.push(body);
        self
    }

    /// Fail unless this build can read the world's format version
    ///
    /// # Errors
    ///
    /// [`PhysicsError::IncompatibleWorld`] for an unparsable or incompatible
    /// version.
    pub fn check_compatible(&self) -> Result<()> {
        if is_version_compatible(&self.format_version, WORLD_FORMAT_VERSION) {
            Ok(())
        } else {
            Err(PhysicsError::IncompatibleWorld {
                found: self.format_version.clone(),
                supported: WORLD_FORMAT_VERSION.to_string(),
            })
        }
    }
}

/// Check whether data written at `found` can be read by `supported`
fn is_version_compatible(found: &str, supported: &str) -> bool {
    let found = match Version::parse(found) {
        Ok(v) => v,
        Err(_) => return false,
    };
    let supported = match Version::parse(supported) {
        Ok(v) => v,
        Err(_) => return false,
    };

    if found.major != supported.major {
        return false;
    }

    if found.major != 0 {
        found.minor <= supported.minor
    } else {
        found.minor == supported.minor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_compatibility() {
        assert!(is_version_compatible("1.0.0", "1.0.0"));
        assert!(is_version_compatible("1.0.5", "1.2.0"));
        assert!(!is_version_compatible("1.3.0", "1.2.0"));
        assert!(!is_version_compatible("2.0.0", "1.2.0"));
        assert!(is_version_compatible("0.2.1", "0.2.0"));
        assert!(!is_version_compatible("0.1.0", "0.2.0"));
        assert!(!is_version_compatible("not-a-version", "1.0.0"));
    }

    #[test]
    fn test_check_compatible() {
        let mut world = WorldState::new("test");
        assert!(world.check_compatible().is_ok());

        world.format_version = "2.0.0".to_string();
        assert!(matches!(
            world.check_compatible(),
            Err(PhysicsError::IncompatibleWorld { found, .. }) if found == "2.0.0"
        ));
    }
}
