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
//! Benchmarks comparing integrator performance and accuracy
//!
//! These benchmarks measure:
//! - Cost of a single step for each scheme on a Kepler orbit
//! - Cost of one full orbit at a fixed step count
//! - Full engine ticks for growing body counts

use celestial_physics::body::{Body, BodyDefinition};
use celestial_physics::integration::{Integrator, IntegratorKind};
use celestial_physics::{EngineConfig, PhysicsEngine, Result, Vector3};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::f64::consts::TAU;

const KINDS: [IntegratorKind; 4] = [
    IntegratorKind::Verlet,
    IntegratorKind::Rk4,
    IntegratorKind::Rk45,
    IntegratorKind::GaussRadau,
];

// Inverse-square pull toward the origin with μ = 1
fn unit_kepler(_: &Body, position: Vector3, _: Vector3, _: f64) -> Result<Vector3> {
    let r = position.length();
    Ok(position * (-1.0 / (r * r * r)))
}

fn satellite() -> Body {
    Body::new(
        BodyDefinition::passive("satellite", 1.0, 1e-3, Vector3::new(1.0, 0.0, 0.0))
            .with_velocity(Vector3::new(0.0, 1.0, 0.0)),
    )
    .expect("valid body")
}

fn bench_single_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_step");
    let dt = TAU / 200.0;

    for kind in KINDS {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            let mut integrator = Integrator::new(kind);
            let mut body = satellite();
            b.iter(|| {
                integrator
                    .step(black_box(&mut body), black_box(dt), 0.0, unit_kepler)
                    .expect("step succeeds")
            });
        });
    }

    group.finish();
}

fn bench_one_orbit(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_one_orbit");
    group.sample_size(20); // Fewer samples for whole-orbit runs

    let steps = 200;
    let dt = TAU / steps as f64;

    for kind in KINDS {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            b.iter(|| {
                let mut integrator = Integrator::new(kind);
                let mut body = satellite();
                for n in 0..steps {
                    integrator
                        .step(&mut body, dt, n as f64 * dt, unit_kepler)
                        .expect("step succeeds");
                }
                black_box(body.position)
            });
        });
    }

    group.finish();
}

// Sun plus a ring of light bodies on circular orbits
fn ring_engine(count: usize) -> PhysicsEngine {
    let mut engine = PhysicsEngine::new(EngineConfig::default().with_timestep(60.0)).expect("valid config");
    let sun = BodyDefinition::massive("sun", 1.989e30, 6.96e8, Vector3::zero());
    for i in 0..count {
        let distance = 5.0e10 + i as f64 * 1.0e9;
        let planet = BodyDefinition::orbiting(format!("body-{}", i), 1.0e22, 1.0e6, &sun, distance);
        engine.add_body(planet).expect("unique id");
    }
    engine.add_body(sun).expect("unique id");
    engine
}

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");

    for count in [10, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut engine = ring_engine(count);
            b.iter(|| engine.step(black_box(60.0)).expect("step succeeds"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_step, bench_one_orbit, bench_engine_tick);
criterion_main!(benches);
