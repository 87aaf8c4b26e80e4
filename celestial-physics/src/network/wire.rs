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
//! Binary snapshot frame
//!
//! All values are little-endian.
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 4    | tick (`u32`)                           |
//! | 4      | 4    | body count (`u32`)                     |
//! | 8      | 72·n | body records                           |
//!
//! Each body record:
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 4    | [`hash_id`] of the body id (`u32`)     |
//! | 4      | 24   | position, 3 × `f64`                    |
//! | 28     | 24   | velocity, 3 × `f64`                    |
//! | 52     | 16   | orientation `[x, y, z, w]`, 4 × `f32`  |
//! | 68     | 4    | angular velocity (`f32`)               |
//!
//! Ids travel as 32-bit hashes, so the receiver needs a map from hash to id
//! built with [`build_id_hash_map`]. Timestamps are not transmitted.
//!
//! Header and records are serialized with `bincode` using fixed-width
//! integers. Arrays carry no length prefix, which keeps every record at
//! exactly [`BODY_RECORD_SIZE`] bytes.

use super::BodyNetworkState;
use crate::body::BodyId;
use crate::error::Result;
use bincode::config::{self, Configuration, Fixint, LittleEndian};
use std::collections::HashMap;
use thiserror::Error;

/// Bytes in the frame header
pub const HEADER_SIZE: usize = 8;

/// Bytes per body record
pub const BODY_RECORD_SIZE: usize = 72;

/// `(tick, count)`
type Header = (u32, u32);

/// `(hash, position, velocity, orientation, angular velocity)`
type Record = (u32, [f64; 3], [f64; 3], [f32; 4], f32);

/// Errors that can occur while packing or unpacking a frame
#[derive(Debug, Error)]
pub enum WireError {
    /// Serializer failure
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// Input ended early or held an invalid value
    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// More records than a `u32` count can describe
    #[error("{0} records do not fit a u32 count")]
    TooManyRecords(usize),

    /// Header count disagrees with the frame length
    #[error("frame declares {count} bodies but has {len} bytes")]
    Truncated {
        /// Declared body count
        count: u32,
        /// Actual frame length
        len: usize,
    },
}

fn wire_config() -> Configuration<LittleEndian, Fixint> {
    config::standard().with_fixed_int_encoding()
}

/// Decoded frame
#[derive(Debug, Clone, PartialEq)]
pub struct WireSnapshot {
    /// Tick the frame was encoded at
    pub tick: u32,
    /// One record per body, in frame order
    pub states: Vec<BodyNetworkState>,
}

/// 32-bit hash of an id: `h = h·31 + c` over UTF-16 code units, wrapping
///
/// ```
/// use celestial_physics::network::hash_id;
///
/// assert_eq!(hash_id(""), 0);
/// assert_eq!(hash_id("ab"), 97 * 31 + 98);
/// ```
pub fn hash_id(id: &str) -> u32 {
    id.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Map from [`hash_id`] back to the id
///
/// When two ids share a hash the later one wins.
pub fn build_id_hash_map<I, S>(ids: I) -> HashMap<u32, BodyId>
where
    I: IntoIterator<Item = S>,
    S: Into<BodyId>,
{
    ids.into_iter()
        .map(|id| {
            let id = id.into();
            (hash_id(id.as_str()), id)
        })
        .collect()
}

/// Pack records into a frame
///
/// Orientation and angular velocity are narrowed to `f32`.
///
/// # Errors
///
/// [`PhysicsError::MalformedSnapshot`](crate::PhysicsError::MalformedSnapshot)
/// if there are more records than a `u32` count can describe.
pub fn encode(tick: u32, states: &[BodyNetworkState]) -> Result<Vec<u8>> {
    let count = u32::try_from(states.len()).map_err(|_| WireError::TooManyRecords(states.len()))?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + states.len() * BODY_RECORD_SIZE);
    let header: Header = (tick, count);
    bincode::serde::encode_into_std_write(header, &mut bytes, wire_config()).map_err(WireError::from)?;

    for state in states {
        let o = state.orientation;
        let record: Record = (
            hash_id(state.id.as_str()),
            state.position,
            state.velocity,
            [o[0] as f32, o[1] as f32, o[2] as f32, o[3] as f32],
            state.angular_velocity as f32,
        );
        bincode::serde::encode_into_std_write(record, &mut bytes, wire_config()).map_err(WireError::from)?;
    }
    Ok(bytes)
}

/// Unpack a frame, stamping every record with `timestamp`
///
/// Hashes missing from `ids` decode as `unknown_<hash>`. Bytes after the
/// last record are ignored.
///
/// # Errors
///
/// [`PhysicsError::MalformedSnapshot`](crate::PhysicsError::MalformedSnapshot)
/// if the frame is shorter than its header says.
pub fn decode(bytes: &[u8], ids: &HashMap<u32, BodyId>, timestamp: f64) -> Result<WireSnapshot> {
    let ((tick, count), mut offset): (Header, usize) =
        bincode::serde::decode_from_slice(bytes, wire_config()).map_err(WireError::from)?;

    let available = (bytes.len() - offset) / BODY_RECORD_SIZE;
    if (count as usize) > available {
        return Err(WireError::Truncated { count, len: bytes.len() }.into());
    }

    let mut states = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let ((hash, position, velocity, orientation, angular_velocity), read): (Record, usize) =
            bincode::serde::decode_from_slice(&bytes[offset..], wire_config()).map_err(WireError::from)?;
        offset += read;

        let id = ids
            .get(&hash)
            .cloned()
            .unwrap_or_else(|| BodyId::new(format!("unknown_{}", hash)));
        states.push(BodyNetworkState {
            id,
            position,
            velocity,
            orientation: orientation.map(f64::from),
            angular_velocity: f64::from(angular_velocity),
            timestamp,
        });
    }

    Ok(WireSnapshot { tick, states })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhysicsError;

    fn state(id: &str) -> BodyNetworkState {
        BodyNetworkState {
            id: BodyId::from(id),
            position: [1.5e11, -2.0, 3.25],
            velocity: [0.0, 29_780.0, -1.0],
            orientation: [0.0, 0.0, 0.0, 1.0],
            angular_velocity: 7.292e-5,
            timestamp: 99.0,
        }
    }

    #[test]
    fn test_hash_matches_known_values() {
        assert_eq!(hash_id("a"), 97);
        assert_eq!(hash_id("earth"), 96_278_602);
        assert_eq!(hash_id("é☃"), 16_954);
        // Surrogate pair hashes as two code units
        assert_eq!(hash_id("😀"), 0xD83D * 31 + 0xDE00);
        // Wraps instead of overflowing
        assert_eq!(hash_id(&"a".repeat(20)), 1_542_361_408);
    }

    #[test]
    fn test_frame_layout() {
        let bytes = encode(7, &[state("earth"), state("moon")]).expect("encodes");
        assert_eq!(bytes.len(), HEADER_SIZE + 2 * BODY_RECORD_SIZE);
        assert_eq!(&bytes[0..4], &7u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &hash_id("earth").to_le_bytes());
        assert_eq!(&bytes[12..20], &1.5e11f64.to_le_bytes());
        assert_eq!(&bytes[60..64], &0.0f32.to_le_bytes());
        assert_eq!(&bytes[72..76], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[76..80], &(7.292e-5f64 as f32).to_le_bytes());
        assert_eq!(&bytes[80..84], &hash_id("moon").to_le_bytes());
    }

    #[test]
    fn test_decode_resolves_ids() {
        let bytes = encode(3, &[state("earth"), state("ghost")]).expect("encodes");
        let ids = build_id_hash_map(["earth", "moon"]);
        let frame = decode(&bytes, &ids, 0.5).expect("decodes");

        assert_eq!(frame.tick, 3);
        assert_eq!(frame.states.len(), 2);
        assert_eq!(frame.states[0].id.as_str(), "earth");
        assert_eq!(frame.states[0].position, [1.5e11, -2.0, 3.25]);
        assert_eq!(frame.states[0].velocity, [0.0, 29_780.0, -1.0]);
        assert_eq!(frame.states[0].timestamp, 0.5);
        assert!((frame.states[0].angular_velocity - 7.292e-5).abs() < 1e-10);
        assert_eq!(frame.states[1].id.as_str(), format!("unknown_{}", hash_id("ghost")));
    }

    #[test]
    fn test_truncated_frames_are_rejected() {
        let bytes = encode(1, &[state("earth")]).expect("encodes");
        let ids = HashMap::new();
        assert!(matches!(
            decode(&bytes[..5], &ids, 0.0),
            Err(PhysicsError::MalformedSnapshot(WireError::Decode(_)))
        ));
        assert!(matches!(
            decode(&bytes[..bytes.len() - 1], &ids, 0.0),
            Err(PhysicsError::MalformedSnapshot(WireError::Truncated { count: 1, .. }))
        ));

        let mut lying = bytes.clone();
        lying[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            decode(&lying, &ids, 0.0),
            Err(PhysicsError::MalformedSnapshot(WireError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_empty_frame() {
        let bytes = encode(42, &[]).expect("encodes");
        assert_eq!(bytes.len(), HEADER_SIZE);
        let frame = decode(&bytes, &HashMap::new(), 0.0).expect("decodes");
        assert_eq!(frame.tick, 42);
        assert!(frame.states.is_empty());
    }
}
