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
//! Two-body integrator comparison
//!
//! Runs the same circular orbit with every integrator and prints the radius
//! error and energy drift after one orbital period.
//!
//! ```bash
//! cargo run --example two_body --release
//! ```

use celestial_physics::integration::IntegratorKind;
use celestial_physics::orbital::orbital_period;
use celestial_physics::{BodyDefinition, EngineConfig, GravityMethod, PhysicsEngine, Vector3};

const CENTRAL_MASS: f64 = 1.0e30;
const RADIUS: f64 = 1.496e11;

fn run(kind: IntegratorKind, dt: f64) -> celestial_physics::Result<(f64, f64)> {
    let config = EngineConfig::default()
        .with_timestep(dt)
        .with_gravity_method(GravityMethod::Direct)
        .with_integrators(kind, kind);
    let mut engine = PhysicsEngine::new(config)?;

    let star = BodyDefinition::massive("star", CENTRAL_MASS, 7.0e8, Vector3::zero());
    let planet = BodyDefinition::orbiting("planet", 6.0e24, 6.4e6, &star, RADIUS);
    engine.add_body(star)?;
    engine.add_body(planet)?;

    let initial = engine.energy().total;
    let mu = engine.body("star").map_or(0.0, |b| b.mu());
    let steps = (orbital_period(mu, RADIUS) / dt).round() as usize;
    for _ in 0..steps {
        engine.step(dt)?;
    }

    let radius = engine.body("planet").map_or(f64::NAN, |b| b.position.length());
    let drift = ((engine.energy().total - initial) / initial).abs();
    Ok(((radius - RADIUS).abs() / RADIUS, drift))
}

fn main() -> celestial_physics::Result<()> {
    print_banner();
    for dt in [86_400.0, 3600.0] {
        println!("Timestep {} s", dt);
        for kind in [
            IntegratorKind::Verlet,
            IntegratorKind::Rk4,
            IntegratorKind::Rk45,
            IntegratorKind::GaussRadau,
        ] {
            let (radius_error, drift) = run(kind, dt)?;
            println!(
                "  {:<12} order {:>2}  radius error {:.3e}  energy drift {:.3e}",
                kind.name(),
                kind.order(),
                radius_error,
                drift
            );
        }
        println!();
    }
    Ok(())
}

fn print_banner() {
    println!("==========================================================");
    println!("       Two-Body Integrator Comparison");
    println!("==========================================================");
    println!();
}
