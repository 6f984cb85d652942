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
//! Paddle rally example
//!
//! A kinematic paddle tracks a gravity-free ball that bounces between the
//! play-area walls and a row of bricks. Bricks are plain actors: they get
//! collision callbacks but no physical response, and are removed when hit.

use log::info;
use microphys::body::{Actor, LimitRect};
use microphys::collision::CollisionSystem;
use microphys::math::{Real, Scalar, Vector2};
use microphys::{ActorArena, ActorHandle};

const BALL: u16 = 0b0001;
const PADDLE: u16 = 0b0010;
const BRICK: u16 = 0b0100;
const FRAME_MS: u32 = 16;

fn main() {
    env_logger::init();

    println!("microphys - Paddle Rally");
    println!("========================\n");

    let mut world = CollisionSystem::new();

    let paddle = world.add_entity(
        Actor::new_kinematic(100.0, 220.0, 40, 6)
            .with_layer(PADDLE)
            .with_mask(BALL),
    );
    let ball = world.add_entity(
        Actor::new_rigid(116.0, 150.0, 8, 8)
            .with_circle(4.0)
            .with_bounce(true)
            .with_restitution(1.0)
            .with_gravity_scale(0.0)
            .with_velocity(Vector2::from_f32(70.0, -90.0))
            .with_limits(LimitRect::world())
            .with_layer(BALL)
            .with_mask(PADDLE | BRICK),
    );

    let mut bricks = Vec::new();
    for row in 0..3 {
        for col in 0..6 {
            let x = 10.0 + col as f32 * 38.0;
            let y = 20.0 + row as f32 * 12.0;
            bricks.push(
                world.add_entity(
                    Actor::new(x, y, 34, 8)
                        .with_layer(BRICK)
                        .with_mask(BALL),
                ),
            );
        }
    }

    let mut on_hit = |arena: &mut ActorArena, me: ActorHandle, other: ActorHandle| {
        if other != ball {
            return;
        }
        let is_brick = arena.get(me).is_some_and(|a| a.layer == BRICK);
        if is_brick {
            // Bounce off the brick before it disappears
            let brick_center = arena.get(me).map(|a| a.hit_box().center());
            if let (Some(center), Some(ball_actor)) = (brick_center, arena.get_mut(ball)) {
                let ball_center = ball_actor.hit_box().center();
                let mut velocity = ball_actor.velocity();
                if (ball_center.y - center.y) * velocity.y < Scalar::ZERO {
                    velocity.y = -velocity.y;
                    ball_actor.set_velocity(velocity);
                }
            }
            arena.remove(me);
        }
    };

    for frame in 0..1200 {
        // Paddle follows the ball horizontally
        let target = world.get(ball).map(|a| a.hit_box().center().x);
        let current = world.get(paddle).map(|a| a.hit_box().center().x);
        if let (Some(target), Some(current)) = (target, current) {
            let dx = Real::clamp(target - current, Scalar::from_i32(-3), Scalar::from_i32(3));
            world.move_and_slide(paddle, Vector2::new(dx, Scalar::ZERO));
        }

        world.step(FRAME_MS, &mut on_hit);

        if frame % 120 == 0 {
            if let Some(actor) = world.get(ball) {
                info!(
                    "frame {}: ball at ({:.1}, {:.1})",
                    frame,
                    actor.position.x.to_f32(),
                    actor.position.y.to_f32()
                );
            }
        }

        if bricks.iter().all(|&brick| !world.contains(brick)) {
            println!("Cleared every brick after {} frames", frame + 1);
            break;
        }
    }

    let broken = bricks.iter().filter(|&&brick| !world.contains(brick)).count();
    println!("Broke {} of {} bricks", broken, bricks.len());
    if let Some(actor) = world.get(ball) {
        println!(
            "Ball finished at ({:.1}, {:.1})",
            actor.position.x.to_f32(),
            actor.position.y.to_f32()
        );
    }
}
