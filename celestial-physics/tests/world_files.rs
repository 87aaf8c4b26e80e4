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
//! Tests for world files, configuration documents and the binary snapshot path

use celestial_physics::body::{BodyKind, DEFAULT_HISTORY_DEPTH};
use celestial_physics::engine::{WorldState, WORLD_FORMAT_VERSION};
use celestial_physics::gravity::{GravityMethod, DEFAULT_SOFTENING};
use celestial_physics::integration::IntegratorKind;
use celestial_physics::network::{build_id_hash_map, decode, encode};
use celestial_physics::{EngineConfig, PhysicsEngine, Vector3};

const BINARY_WORLD: &str = r#"{
    "name": "Binary",
    "description": "A star and a probe",
    "bodies": [
        {
            "id": "star",
            "mass": 1.0e30,
            "radius": 7.0e8,
            "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
            "rotation_period": 2.2e6
        },
        {
            "id": "probe",
            "kind": "passive",
            "mass": 1000.0,
            "radius": 5.0,
            "softening": 0.0,
            "position": { "x": 1.0e11, "y": 0.0, "z": 0.0 },
            "velocity": { "x": 0.0, "y": 3.0e4, "z": 0.0 },
            "parent_id": "star"
        }
    ]
}"#;

#[test]
fn test_world_json_fills_defaults() {
    let world: WorldState = serde_json::from_str(BINARY_WORLD).expect("valid world");
    assert_eq!(world.format_version, WORLD_FORMAT_VERSION);
    assert_eq!(world.seed, 0);
    assert!(world.metadata.is_none());

    let star = &world.bodies[0];
    assert_eq!(star.kind, BodyKind::Massive);
    assert_eq!(star.softening, DEFAULT_SOFTENING);
    assert_eq!(star.velocity, Vector3::zero());

    let probe = &world.bodies[1];
    assert_eq!(probe.kind, BodyKind::Passive);
    assert_eq!(probe.softening, 0.0);
    assert_eq!(probe.parent_id.as_ref().map(|p| p.as_str()), Some("star"));
}

#[test]
fn test_load_world_builds_registry() {
    let world: WorldState = serde_json::from_str(BINARY_WORLD).expect("valid world");
    let mut engine = PhysicsEngine::default();
    engine.load_world(&world).expect("compatible world");

    assert_eq!(engine.body_count(), 2);
    assert_eq!(engine.massive_bodies().count(), 1);
    let star = engine.body("star").expect("present");
    assert_eq!(star.children().len(), 1);
    assert!(star.angular_velocity > 0.0);
    assert_eq!(star.history().depth(), DEFAULT_HISTORY_DEPTH);
}

#[test]
fn test_export_world_round_trips_through_json() {
    let world: WorldState = serde_json::from_str(BINARY_WORLD).expect("valid world");
    let config = EngineConfig::default().with_timestep(60.0);
    let mut engine = PhysicsEngine::new(config.clone()).expect("valid config");
    engine.load_world(&world).expect("compatible world");
    for _ in 0..10 {
        engine.step(60.0).expect("step succeeds");
    }

    let exported = engine.export_world("Binary", "after ten minutes");
    let metadata = exported.metadata.expect("export records metadata");
    assert_eq!(metadata.export_tick, 10);
    assert_eq!(metadata.export_time, 600.0);

    let json = serde_json::to_string_pretty(&exported).expect("serializes");
    let reloaded: WorldState = serde_json::from_str(&json).expect("parses");
    assert_eq!(reloaded, exported);

    let mut copy = PhysicsEngine::new(config).expect("valid config");
    copy.load_world(&reloaded).expect("compatible world");
    for body in engine.bodies() {
        let twin = copy.body(body.id().as_str()).expect("same registry");
        assert_eq!(twin.position, body.position);
        assert_eq!(twin.velocity, body.velocity);
        assert!((twin.orientation.dot(body.orientation) - 1.0).abs() < 1e-12);
    }

    // Stepping both copies gives identical results
    engine.step(60.0).expect("step succeeds");
    copy.step(60.0).expect("step succeeds");
    let a = engine.body("probe").expect("present");
    let b = copy.body("probe").expect("present");
    assert_eq!(a.position, b.position);
}

#[test]
fn test_partial_config_document() {
    let json = r#"{
        "gravity_method": "direct",
        "theta": 0.3,
        "default_integrator": "rk4",
        "close_encounter_integrator": "gauss-radau",
        "adaptive": { "tolerance": 1e-8 }
    }"#;
    let config: EngineConfig = serde_json::from_str(json).expect("valid config");
    assert_eq!(config.gravity_method, GravityMethod::Direct);
    assert_eq!(config.theta, 0.3);
    assert_eq!(config.default_integrator, IntegratorKind::Rk4);
    assert_eq!(config.close_encounter_integrator, IntegratorKind::GaussRadau);
    assert_eq!(config.adaptive.tolerance, 1e-8);
    assert_eq!(config.adaptive.max_dt, 3600.0);
    assert_eq!(config.fixed_timestep, 1.0 / 60.0);
    assert!(config.validate().is_ok());

    let text = serde_json::to_string(&EngineConfig::default()).expect("serializes");
    assert!(text.contains("\"barnes-hut\""));
    assert!(text.contains("\"verlet\""));
}

#[test]
fn test_binary_snapshot_drives_follower() {
    let world: WorldState = serde_json::from_str(BINARY_WORLD).expect("valid world");
    let mut server = PhysicsEngine::default();
    let mut client = PhysicsEngine::default();
    server.load_world(&world).expect("compatible world");
    client.load_world(&world).expect("compatible world");

    for _ in 0..30 {
        server.step(1.0).expect("step succeeds");
    }

    let frame = encode(server.tick() as u32, &server.export_states()).expect("encodes");
    let ids = build_id_hash_map(client.bodies().iter().map(|b| b.id().clone()));
    let snapshot = decode(&frame, &ids, server.time()).expect("decodes");
    assert_eq!(snapshot.tick, 30);
    assert_eq!(client.import_states(&snapshot.states), 2);

    for body in server.bodies() {
        let mirrored = client.body(body.id().as_str()).expect("same registry");
        assert_eq!(mirrored.position, body.position);
        assert_eq!(mirrored.velocity, body.velocity);
        let q_error = (mirrored.orientation.dot(body.orientation).abs() - 1.0).abs();
        assert!(q_error < 1e-6);
    }
}
