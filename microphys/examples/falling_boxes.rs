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
//! Falling boxes example
//!
//! Drops a handful of rigid boxes and a bouncing ball onto a static floor
//! and prints where everything comes to rest.
//!
//! Run with `RUST_LOG=debug` to see the pipeline's capacity diagnostics.

use microphys::body::{Actor, LimitRect};
use microphys::collision::{CollisionSystem, NoCallbacks};
use microphys::config::PhysicsConfig;
use microphys::math::Real;

const SOLID: u16 = 0b0001;
const FRAME_MS: u32 = 16;

fn main() {
    env_logger::init();

    println!("microphys - Falling Boxes");
    println!("=========================\n");

    let config = PhysicsConfig::default().with_gravity(300.0);
    let mut world = match CollisionSystem::with_config(config) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("invalid configuration: {}", err);
            return;
        }
    };

    world.add_entity(
        Actor::new_static(0.0, 220.0, 240, 20)
            .with_layer(SOLID)
            .with_mask(SOLID),
    );

    let mut boxes = Vec::new();
    for i in 0..5 {
        let x = 20.0 + i as f32 * 40.0;
        let y = 10.0 + i as f32 * 15.0;
        boxes.push(
            world.add_entity(
                Actor::new_rigid(x, y, 16, 16)
                    .with_layer(SOLID)
                    .with_mask(SOLID)
                    .with_friction(0.5)
                    .with_limits(LimitRect::world()),
            ),
        );
    }

    let ball = world.add_entity(
        Actor::new_rigid(112.0, 0.0, 12, 12)
            .with_circle(6.0)
            .with_bounce(true)
            .with_restitution(0.7)
            .with_layer(SOLID)
            .with_mask(SOLID)
            .with_limits(LimitRect::world()),
    );

    println!("Spawned {} actors\n", world.len());

    for frame in 0..180 {
        world.step(FRAME_MS, &mut NoCallbacks);

        if frame % 30 == 0 {
            if let Some(actor) = world.get(ball) {
                println!(
                    "frame {:3}: ball at ({:6.2}, {:6.2}) vy = {:7.2}",
                    frame,
                    actor.position.x.to_f32(),
                    actor.position.y.to_f32(),
                    actor.velocity().y.to_f32()
                );
            }
        }
    }

    println!("\nResting positions:");
    for handle in &boxes {
        if let Some(actor) = world.get(*handle) {
            println!(
                "  {}: ({:6.2}, {:6.2})",
                handle,
                actor.position.x.to_f32(),
                actor.position.y.to_f32()
            );
        }
    }

    let stats = world.stats();
    println!(
        "\nLast frame: {} pairs, {} static pairs, {} dropped",
        stats.pairs,
        stats.static_pairs,
        stats.total_dropped()
    );
}
