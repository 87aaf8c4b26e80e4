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
//! Engine-level tests for collision and SOI events, history and replication

use celestial_physics::body::BodyDefinition;
use celestial_physics::{
    CollisionEvent, EngineConfig, PhysicsEngine, SimulationState, SoiTransitionEvent, Vector3,
};
use std::cell::RefCell;
use std::rc::Rc;

fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    (events, move |event: &T| sink.borrow_mut().push(event.clone()))
}

/// Star with a planet 1e11 m away, and a fast probe flying past the planet
fn flyby_engine() -> PhysicsEngine {
    let mut engine = PhysicsEngine::new(EngineConfig::default().with_timestep(10.0)).expect("valid config");
    engine
        .add_body(BodyDefinition::massive("star", 1.0e30, 7.0e8, Vector3::zero()))
        .expect("add star");
    engine
        .add_body(
            BodyDefinition::massive("planet", 6.0e24, 6.4e6, Vector3::new(1.0e11, 0.0, 0.0))
                .with_parent("star"),
        )
        .expect("add planet");
    engine
        .add_body(
            BodyDefinition::passive("probe", 1000.0, 10.0, Vector3::new(9.8e10, 1.0e8, 0.0))
                .with_velocity(Vector3::new(1.0e6, 0.0, 0.0)),
        )
        .expect("add probe");
    engine
}

#[test]
fn test_soi_transition_fires_once_per_change() {
    let mut engine = flyby_engine();
    let (events, callback) = recorder::<SoiTransitionEvent>();
    engine.set_on_soi_transition(callback);

    for _ in 0..400 {
        engine.step(10.0).expect("step succeeds");
    }

    let events = events.borrow();
    let path: Vec<(Option<&str>, Option<&str>)> = events
        .iter()
        .map(|e| (e.from.as_ref().map(|b| b.as_str()), e.to.as_ref().map(|b| b.as_str())))
        .collect();
    assert_eq!(
        path,
        vec![
            (None, Some("star")),
            (Some("star"), Some("planet")),
            (Some("planet"), Some("star")),
        ]
    );
    assert!(events.iter().all(|e| e.body.as_str() == "probe"));
    assert_eq!(events[0].timestamp, 0.0);
    assert!(events[1].timestamp < events[2].timestamp);
    assert_eq!(engine.current_soi("probe").map(|b| b.as_str()), Some("star"));
}

#[test]
fn test_soi_tracking_can_be_disabled() {
    let mut engine = flyby_engine();
    let config = engine.config().clone().with_soi(false);
    engine.set_config(config).expect("valid config");
    let (events, callback) = recorder::<SoiTransitionEvent>();
    engine.set_on_soi_transition(callback);

    for _ in 0..400 {
        engine.step(10.0).expect("step succeeds");
    }
    assert!(events.borrow().is_empty());
    assert!(engine.current_soi("probe").is_none());
}

#[test]
fn test_collision_reported_when_bodies_overlap() {
    let mut engine = PhysicsEngine::default();
    engine
        .add_body(BodyDefinition::passive("a", 1.0, 10.0, Vector3::zero()))
        .expect("add a");
    engine
        .add_body(
            BodyDefinition::passive("b", 1.0, 10.0, Vector3::new(100.0, 0.0, 0.0))
                .with_velocity(Vector3::new(-10.0, 0.0, 0.0)),
        )
        .expect("add b");
    let (events, callback) = recorder::<CollisionEvent>();
    engine.set_on_collision(callback);

    // Surfaces touch after eight steps and overlap after nine
    for _ in 0..9 {
        engine.step(1.0).expect("step succeeds");
    }

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.body_a.as_str(), "a");
    assert_eq!(event.body_b.as_str(), "b");
    assert_eq!(event.point, Vector3::new(10.0, 0.0, 0.0));
    assert_eq!(event.relative_velocity, Vector3::new(-10.0, 0.0, 0.0));
    assert_eq!(event.timestamp, 8.0);
}

#[test]
fn test_collision_pairs_list_massive_bodies_first() {
    let mut engine = PhysicsEngine::default();
    engine
        .add_body(BodyDefinition::passive("debris", 1.0, 10.0, Vector3::new(5.0, 0.0, 0.0)))
        .expect("add debris");
    engine
        .add_body(BodyDefinition::massive("rock", 1.0, 10.0, Vector3::zero()))
        .expect("add rock");
    let (events, callback) = recorder::<CollisionEvent>();
    engine.set_on_collision(callback);

    engine.step(1.0).expect("step succeeds");
    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].body_a.as_str(), "rock");
    assert_eq!(events[0].body_b.as_str(), "debris");
}

#[test]
fn test_collisions_can_be_disabled() {
    let mut engine = PhysicsEngine::new(EngineConfig::default().with_collisions(false)).expect("valid config");
    engine
        .add_body(BodyDefinition::passive("a", 1.0, 10.0, Vector3::zero()))
        .expect("add a");
    engine
        .add_body(BodyDefinition::passive("b", 1.0, 10.0, Vector3::new(1.0, 0.0, 0.0)))
        .expect("add b");
    let (events, callback) = recorder::<CollisionEvent>();
    engine.set_on_collision(callback);
    engine.step(1.0).expect("step succeeds");
    assert!(events.borrow().is_empty());
}

#[test]
fn test_remove_body_mid_simulation() {
    let mut engine = flyby_engine();
    engine
        .add_body(
            BodyDefinition::massive("moon", 7.3e22, 1.7e6, Vector3::new(1.0e11 + 3.8e8, 0.0, 0.0))
                .with_parent("planet"),
        )
        .expect("add moon");

    for _ in 0..50 {
        engine.step(10.0).expect("step succeeds");
    }
    let removed = engine.remove_body("planet").expect("planet present");
    assert_eq!(removed.id().as_str(), "planet");

    for _ in 0..50 {
        engine.step(10.0).expect("step succeeds");
    }

    assert!(engine.body("planet").is_none());
    assert_eq!(engine.body_count(), 3);
    assert_eq!(engine.massive_bodies().count(), 2);
    assert!(engine.export_states().iter().all(|s| s.id.as_str() != "planet"));
    // Orphaned moon falls back to an unbounded SOI
    assert!(engine.body("moon").expect("moon present").soi_radius().is_infinite());
    assert!(engine.body("star").expect("star present").children().is_empty());
}

#[test]
fn test_tick_callback_reports_summary() {
    let mut engine = flyby_engine();
    let (states, callback) = recorder::<SimulationState>();
    engine.set_on_tick(callback);

    let steps = engine.update(25.0).expect("update succeeds");
    assert_eq!(steps, 2);

    let states = states.borrow();
    assert_eq!(states.len(), 2);
    let last = states[1];
    assert_eq!(last.tick, 2);
    assert_eq!(last.time, 20.0);
    assert_eq!(last.body_count, 3);
    assert_eq!(last.massive_bodies, 2);
    assert_eq!(last.passive_bodies, 1);
    assert_eq!(last.total_energy, last.kinetic_energy + last.potential_energy);
    assert!((engine.interpolation_alpha() - 0.5).abs() < 1e-12);
}

#[test]
fn test_history_supports_interpolation() {
    let config = EngineConfig::default().with_timestep(1.0).with_history(4);
    let mut engine = PhysicsEngine::new(config).expect("valid config");
    engine
        .add_body(
            BodyDefinition::passive("drifter", 1.0, 1.0, Vector3::zero())
                .with_velocity(Vector3::new(1.0, 0.0, 0.0)),
        )
        .expect("add drifter");

    for _ in 0..6 {
        engine.step(1.0).expect("step succeeds");
    }

    let drifter = engine.body("drifter").expect("present");
    assert_eq!(drifter.history().len(), 4);
    let mid = drifter.interpolated_state(5.5).expect("two or more snapshots");
    assert_eq!(mid.position, Vector3::new(5.5, 0.0, 0.0));
    // Outside the recorded range the latest snapshot is returned
    let late = drifter.interpolated_state(100.0).expect("two or more snapshots");
    assert_eq!(late.time, 6.0);
}

#[test]
fn test_states_replicate_between_engines() {
    let mut server = flyby_engine();
    let mut client = flyby_engine();
    for _ in 0..20 {
        server.step(10.0).expect("step succeeds");
    }

    let mut states = server.export_states();
    assert!(states.iter().all(|s| s.timestamp == 200.0));
    let mut stranger = states[0].clone();
    stranger.id = "stranger".into();
    states.push(stranger);

    let applied = client.import_states(&states);
    assert_eq!(applied, 3);
    for body in server.bodies() {
        let mirrored = client.body(body.id().as_str()).expect("same registry");
        assert_eq!(mirrored.position, body.position);
        assert_eq!(mirrored.velocity, body.velocity);
        assert_eq!(mirrored.history().latest().map(|s| s.time), Some(200.0));
    }
    assert!(client.body("stranger").is_none());

    // The follower can keep simulating from the imported state
    client.step(10.0).expect("step succeeds");
}
