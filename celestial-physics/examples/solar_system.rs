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
//! Solar System N-Body Simulation Example
//!
//! Inner solar system with the Moon and a spacecraft, run through the
//! engine's fixed-timestep loop. It showcases:
//!
//! - Barnes–Hut or direct gravity
//! - Selectable integrators
//! - Energy drift tracking
//! - Sphere-of-influence transitions for a passive spacecraft
//!
//! # Physical Constants
//!
//! All values use SI units (meters, kilograms, seconds) based on:
//! - NASA Planetary Fact Sheet: https://nssdc.gsfc.nasa.gov/planetary/factsheet/
//!
//! # Running
//!
//! ```bash
//! # Run with default settings (Verlet integrator, Barnes–Hut, 1 Earth year)
//! cargo run --example solar_system --release
//!
//! # Run with RK4 and direct summation
//! cargo run --example solar_system --release -- --integrator rk4 --gravity direct
//!
//! # Run for 10 years with a one-hour timestep
//! cargo run --example solar_system --release -- --years 10 --timestep 3600
//! ```

use celestial_physics::gravity::{GravityMethod, GRAVITATIONAL_CONSTANT};
use celestial_physics::integration::AdaptiveSettings;
use celestial_physics::orbital::{ASTRONOMICAL_UNIT, EARTH_ORBITAL_PERIOD};
use celestial_physics::{BodyDefinition, EngineConfig, IntegratorKind, PhysicsEngine, Vector3};

/// One Earth day in seconds
const DAY: f64 = 86400.0;

/// Celestial body data structure
struct Planet {
    id: &'static str,
    mass: f64,     // kg
    radius: f64,   // m
    distance: f64, // AU
    rotation: f64, // sidereal day, s
}

/// Source: https://nssdc.gsfc.nasa.gov/planetary/factsheet/
const PLANETS: &[Planet] = &[
    Planet { id: "mercury", mass: 3.301e23, radius: 2.4397e6, distance: 0.387, rotation: 5.0679e6 },
    Planet { id: "venus", mass: 4.867e24, radius: 6.0518e6, distance: 0.723, rotation: -2.0997e7 },
    Planet { id: "earth", mass: 5.972e24, radius: 6.371e6, distance: 1.0, rotation: 86_164.1 },
    Planet { id: "mars", mass: 6.417e23, radius: 3.3895e6, distance: 1.524, rotation: 88_642.7 },
];

/// Simulation configuration
struct Options {
    integrator: IntegratorKind,
    gravity: GravityMethod,
    timestep: f64, // seconds
    years: f64,
}

fn parse_options() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        integrator: IntegratorKind::Verlet,
        gravity: GravityMethod::BarnesHut,
        timestep: 600.0,
        years: 1.0,
    };

    let mut i = 1;
    while i < args.len() {
        let value = match args.get(i + 1) {
            Some(value) => value.as_str(),
            None => {
                eprintln!("Error: {} requires an argument", args[i]);
                std::process::exit(1);
            }
        };
        match args[i].as_str() {
            "--integrator" => match value.parse() {
                Ok(kind) => options.integrator = kind,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    std::process::exit(1);
                }
            },
            "--gravity" => {
                options.gravity = match value {
                    "direct" => GravityMethod::Direct,
                    "barnes-hut" | "tree" => GravityMethod::BarnesHut,
                    other => {
                        eprintln!("Error: unknown gravity method '{}'", other);
                        std::process::exit(1);
                    }
                }
            }
            "--timestep" => match value.parse::<f64>() {
                Ok(dt) => options.timestep = dt,
                Err(_) => eprintln!("Warning: invalid timestep '{}', using {:.0} s", value, options.timestep),
            },
            "--years" => match value.parse::<f64>() {
                Ok(years) => options.years = years,
                Err(_) => eprintln!("Warning: invalid duration '{}', using {} years", value, options.years),
            },
            other => {
                eprintln!("Error: unknown option '{}'", other);
                std::process::exit(1);
            }
        }
        i += 2;
    }
    options
}

fn build_system(engine: &mut PhysicsEngine) -> celestial_physics::Result<()> {
    let sun = BodyDefinition::massive("sun", 1.989e30, 6.957e8, Vector3::zero())
        .with_name("Sun")
        .with_rotation(2.192e6, 0.1265);

    let mut earth = None;
    for planet in PLANETS {
        let definition = BodyDefinition::orbiting(
            planet.id,
            planet.mass,
            planet.radius,
            &sun,
            planet.distance * ASTRONOMICAL_UNIT,
        )
        .with_rotation(planet.rotation, 0.0);
        if planet.id == "earth" {
            earth = Some(definition.clone());
        }
        engine.add_body(definition)?;
    }

    if let Some(earth) = earth {
        engine.add_body(BodyDefinition::orbiting("moon", 7.342e22, 1.7374e6, &earth, 3.844e8))?;

        // Spacecraft in a 400 km parking orbit
        let leo = BodyDefinition::orbiting("station", 4.2e5, 50.0, &earth, earth.radius + 4.0e5);
        engine.add_body(BodyDefinition {
            kind: celestial_physics::BodyKind::Passive,
            ..leo
        })?;
    }

    engine.add_body(sun)?;
    Ok(())
}

fn main() -> celestial_physics::Result<()> {
    let options = parse_options();

    println!("==========================================================");
    println!("       Solar System N-Body Simulation");
    println!("==========================================================");
    println!();
    println!("Physical Constants:");
    println!("  G = {:.5e} m³/(kg⋅s²)", GRAVITATIONAL_CONSTANT);
    println!("  1 AU = {:.5e} m", ASTRONOMICAL_UNIT);
    println!("  1 year = {:.5e} s", EARTH_ORBITAL_PERIOD);
    println!();
    println!("Integrator: {}  Gravity: {:?}  Timestep: {} s", options.integrator, options.gravity, options.timestep);

    let config = EngineConfig::default()
        .with_timestep(options.timestep)
        .with_gravity_method(options.gravity)
        .with_integrators(options.integrator, IntegratorKind::Rk45)
        // Error is an absolute length, so use meters at heliocentric scale
        .with_adaptive(AdaptiveSettings {
            tolerance: 1.0,
            min_dt: 1.0,
            max_dt: options.timestep.max(1.0),
        });
    let mut engine = PhysicsEngine::new(config)?;
    build_system(&mut engine)?;

    engine.set_on_soi_transition(|event| {
        let name = |id: &Option<celestial_physics::BodyId>| {
            id.as_ref().map_or("none".to_string(), ToString::to_string)
        };
        println!(
            "  [t = {:.2} d] {} left {} for {}",
            event.timestamp / DAY,
            event.body,
            name(&event.from),
            name(&event.to)
        );
    });
    engine.set_on_collision(|event| {
        println!("  [t = {:.2} d] collision: {} / {}", event.timestamp / DAY, event.body_a, event.body_b);
    });

    let initial = engine.energy();
    println!("Bodies: {}  Initial energy: {:.6e} J", engine.body_count(), initial.total);
    println!();

    let total_steps = (options.years * EARTH_ORBITAL_PERIOD / options.timestep).round() as u64;
    let report_every = ((30.0 * DAY) / options.timestep).round().max(1.0) as u64;

    for step in 1..=total_steps {
        engine.step(options.timestep)?;
        if step % report_every == 0 || step == total_steps {
            let energy = engine.energy();
            let drift = ((energy.total - initial.total) / initial.total).abs();
            let earth_distance = engine
                .body("earth")
                .map(|earth| earth.position.length() / ASTRONOMICAL_UNIT)
                .unwrap_or(f64::NAN);
            println!(
                "day {:>7.1}  E = {:.9e} J  drift = {:.3e}  earth at {:.5} AU",
                engine.time() / DAY,
                energy.total,
                drift,
                earth_distance
            );
        }
    }

    println!();
    println!("Center of mass: {}", engine.center_of_mass());
    println!("Angular momentum: {}", engine.angular_momentum());
    Ok(())
}
