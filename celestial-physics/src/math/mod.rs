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
//! Vector and quaternion math kernel
//!
//! Value types in double precision. Both are `Copy`; arithmetic returns new
//! values rather than mutating in place, so integrator stages can be written
//! as plain expressions.

mod quaternion;
mod vector;

pub use quaternion::Quaternion;
pub use vector::Vector3;
