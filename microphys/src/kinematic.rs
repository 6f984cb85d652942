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
//! Explicit movement for kinematic bodies
//!
//! # Sub-stepping
//!
//! `move_and_collide` splits the motion into `kinematic_substeps` equal
//! steps. After each step the actor's box is tested against every blocking
//! actor: enabled, layer-matching and not a rigid body (rigid bodies are
//! pushed out by relaxation instead). A blocker stops the move when the
//! overlap at the new step is not smaller than the overlap at the previous
//! step, so an actor that starts slightly embedded can still back out of a
//! surface while one moving into it stops at the last clear step.
//!
//! The reported normal is taken from the minimum-overlap axis at the
//! blocked step, the same rule the box-box narrow phase uses.
//!
//! # Sliding
//!
//! `move_and_slide` repeats `move_and_collide` with the leftover motion
//! projected onto the hit surface, up to `max_slides` times, and classifies
//! each hit normal against the up direction `(0, -1)`:
//!
//! - `n · up >= floor_threshold`: floor
//! - `n · up <= -floor_threshold`: ceiling
//! - otherwise: wall
//!
//! The flags are cleared at the start of every call.

use crate::arena::ActorHandle;
use crate::body::Actor;
use crate::collision::{aabb_aabb, contact, overlaps, CollisionSystem};
use crate::geometry::layers_interact;
use crate::math::{Real, Scalar, Vector2};

/// Result of a blocked move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicCollision {
    /// Actor that blocked the move
    pub collider: ActorHandle,
    /// Surface normal pointing back towards the mover
    pub normal: Vector2,
    /// Where the mover stopped
    pub position: Vector2,
    /// Distance covered before stopping
    pub travel: Scalar,
    /// Distance left over
    pub remainder: Scalar,
}

/// Final position of a move plus the collision that stopped it, if any
struct Sweep {
    position: Vector2,
    hit: Option<KinematicCollision>,
}

/// Up direction used to classify contacts
pub fn up() -> Vector2 {
    Vector2::new(Scalar::ZERO, -Scalar::ONE)
}

fn penetration(mover: &Actor, other: &Actor) -> Scalar {
    contact(mover, other).map_or(Scalar::ZERO, |c| c.penetration)
}

impl CollisionSystem {
    /// Move an actor by `motion`, stopping at the first blocking contact
    ///
    /// Returns the collision that stopped the move, or `None` if the full
    /// motion was applied. Stale handles are ignored.
    pub fn move_and_collide(
        &mut self,
        handle: ActorHandle,
        motion: Vector2,
    ) -> Option<KinematicCollision> {
        let sweep = self.sweep(handle, motion)?;
        if let Some(actor) = self.get_mut(handle) {
            actor.position = sweep.position;
        }
        sweep.hit
    }

    /// Like [`move_and_collide`](Self::move_and_collide) but leaves the
    /// actor where it is
    pub fn test_move(&self, handle: ActorHandle, motion: Vector2) -> Option<KinematicCollision> {
        self.sweep(handle, motion)?.hit
    }

    /// Move an actor, sliding along whatever it hits
    ///
    /// Updates the actor's floor, ceiling and wall flags. Returns `true` if
    /// any collision happened.
    pub fn move_and_slide(&mut self, handle: ActorHandle, motion: Vector2) -> bool {
        let threshold = self.floor_threshold();
        let max_slides = self.config().max_slides;

        match self.get_mut(handle) {
            Some(actor) => {
                if let Some(body) = actor.body.as_mut() {
                    body.contacts = Default::default();
                }
            }
            None => return false,
        }

        let mut current = motion;
        let mut collided = false;

        for _ in 0..max_slides {
            let Some(hit) = self.move_and_collide(handle, current) else {
                break;
            };
            collided = true;

            let facing = hit.normal.dot(up());
            if let Some(body) = self.get_mut(handle).and_then(|a| a.body.as_mut()) {
                if facing >= threshold {
                    body.contacts.on_floor = true;
                } else if facing <= -threshold {
                    body.contacts.on_ceiling = true;
                } else {
                    body.contacts.on_wall = true;
                }
            }

            current = (current.normalized() * hit.remainder).slide(hit.normal);
            if current.is_zero_approx() {
                break;
            }
        }

        collided
    }

    fn sweep(&self, handle: ActorHandle, motion: Vector2) -> Option<Sweep> {
        let actor = self.get(handle)?;
        let start = actor.position;

        if motion.is_zero_approx() || !actor.enabled {
            return Some(Sweep {
                position: start + motion,
                hit: None,
            });
        }

        let steps = i32::try_from(self.config().kinematic_substeps)
            .unwrap_or(i32::MAX)
            .max(1);
        let step = motion / Scalar::from_i32(steps);
        let mut ahead = actor.clone();
        let mut previous = actor.clone();

        for i in 1..=steps {
            ahead.position = if i == steps {
                start + motion
            } else {
                start + step * Scalar::from_i32(i)
            };

            if let Some(collider) = self.find_blocker(handle, &ahead, &previous) {
                let normal = self
                    .get(collider)
                    .and_then(|other| aabb_aabb(&ahead.hit_box(), &other.hit_box()))
                    .map_or_else(|| -motion.normalized(), |c| c.normal);
                let travel = (previous.position - start).length();
                let remainder = Real::max(motion.length() - travel, Scalar::ZERO);

                return Some(Sweep {
                    position: previous.position,
                    hit: Some(KinematicCollision {
                        collider,
                        normal,
                        position: previous.position,
                        travel,
                        remainder,
                    }),
                });
            }

            previous.position = ahead.position;
        }

        Some(Sweep {
            position: start + motion,
            hit: None,
        })
    }

    /// First actor that `ahead` runs into without getting any less embedded
    fn find_blocker(&self, handle: ActorHandle, ahead: &Actor, previous: &Actor) -> Option<ActorHandle> {
        for (other_handle, other) in self.actors().iter() {
            if other_handle == handle || !other.enabled || other.is_rigid() {
                continue;
            }
            if !layers_interact(ahead.layer, ahead.mask, other.layer, other.mask) {
                continue;
            }
            if !overlaps(ahead, other) {
                continue;
            }
            if !overlaps(previous, other) {
                return Some(other_handle);
            }
            if penetration(ahead, other) >= penetration(previous, other) {
                return Some(other_handle);
            }
        }
        None
    }
}

impl Actor {
    /// Translate without any collision checks
    ///
    /// Fallback for actors that are not registered with a
    /// [`CollisionSystem`]; never reports a collision.
    pub fn move_and_collide(&mut self, motion: Vector2) -> Option<KinematicCollision> {
        self.position += motion;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhysicsConfig, MAX_KINEMATIC_SUBSTEPS};
    use crate::math::scalar;

    const SOLID: u16 = 0b1;

    fn solid(actor: Actor) -> Actor {
        actor.with_layer(SOLID).with_mask(SOLID)
    }

    #[test]
    fn test_stops_before_wall() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        let wall = world.add_entity(solid(Actor::new_static(50.0, 0.0, 10, 10)));

        let hit = world
            .move_and_collide(mover, Vector2::from_f32(55.0, 0.0))
            .expect("wall is in the way");

        let x = world.get(mover).map(|a| a.position.x);
        assert_eq!(x, Some(scalar(27.5)));
        assert_eq!(hit.collider, wall);
        assert_eq!(hit.normal, Vector2::from_f32(-1.0, 0.0));
        assert_eq!(hit.travel, scalar(27.5));
        assert_eq!(hit.remainder, scalar(27.5));
    }

    #[test]
    fn test_maximum_substeps_stop_close_to_wall() {
        let config = PhysicsConfig::default().with_kinematic_substeps(MAX_KINEMATIC_SUBSTEPS);
        let mut world = match CollisionSystem::with_config(config) {
            Ok(world) => world,
            Err(err) => panic!("maximum sub-steps rejected: {}", err),
        };
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new_static(50.0, 0.0, 10, 10)));

        let hit = world
            .move_and_collide(mover, Vector2::from_f32(64.0, 0.0))
            .expect("wall is in the way");

        assert_eq!(world.get(mover).map(|a| a.position.x), Some(scalar(40.0)));
        assert_eq!(hit.travel, scalar(40.0));
        assert_eq!(hit.remainder, scalar(24.0));
    }

    #[test]
    fn test_free_motion_is_applied_fully() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        assert!(world.move_and_collide(mover, Vector2::from_f32(12.0, -4.0)).is_none());
        assert_eq!(
            world.get(mover).map(|a| a.position),
            Some(Vector2::from_f32(12.0, -4.0))
        );
    }

    #[test]
    fn test_rigid_bodies_do_not_block() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new_rigid(20.0, 0.0, 10, 10)));
        assert!(world.move_and_collide(mover, Vector2::from_f32(30.0, 0.0)).is_none());
    }

    #[test]
    fn test_plain_actors_block() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new(20.0, 0.0, 10, 10)));
        assert!(world.move_and_collide(mover, Vector2::from_f32(30.0, 0.0)).is_some());
    }

    #[test]
    fn test_test_move_leaves_actor_in_place() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new_static(50.0, 0.0, 10, 10)));

        let hit = world.test_move(mover, Vector2::from_f32(55.0, 0.0));
        assert!(hit.is_some());
        assert_eq!(world.get(mover).map(|a| a.position), Some(Vector2::ZERO));
    }

    #[test]
    fn test_embedded_actor_can_back_out() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new_static(8.0, -20.0, 10, 50)));

        assert!(world.move_and_collide(mover, Vector2::from_f32(-8.0, 0.0)).is_none());
        assert_eq!(
            world.get(mover).map(|a| a.position),
            Some(Vector2::from_f32(-8.0, 0.0))
        );
    }

    #[test]
    fn test_wall_flags_are_per_call() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new_static(20.0, -50.0, 10, 100)));

        assert!(world.move_and_slide(mover, Vector2::from_f32(15.0, 0.0)));
        let actor = world.get(mover).cloned().expect("mover exists");
        assert!(actor.is_on_wall());
        assert!(!actor.is_on_floor());
        assert!(!actor.is_on_ceiling());
        assert!(actor.position.x < scalar(10.0));

        assert!(!world.move_and_slide(mover, Vector2::from_f32(-5.0, 0.0)));
        assert!(!world.get(mover).is_some_and(Actor::is_on_wall));
    }

    #[test]
    fn test_slide_along_floor() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new_static(-100.0, 20.0, 300, 10)));

        // Diagonal into the floor: stops vertically, keeps sliding sideways
        assert!(world.move_and_slide(mover, Vector2::from_f32(20.0, 20.0)));
        let actor = world.get(mover).cloned().expect("mover exists");
        assert!(actor.is_on_floor());
        assert!(!actor.is_on_wall());
        assert!(actor.position.y <= scalar(10.0));
        assert!(actor.position.x > scalar(10.0));
    }

    #[test]
    fn test_detached_move_is_unconditional() {
        let mut actor = Actor::new_kinematic(0.0, 0.0, 10, 10);
        assert!(actor.move_and_collide(Vector2::from_f32(100.0, 5.0)).is_none());
        assert_eq!(actor.position, Vector2::from_f32(100.0, 5.0));
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut world = CollisionSystem::new();
        let mover = world.add_entity(Actor::new_kinematic(0.0, 0.0, 10, 10));
        world.remove_entity(mover);
        assert!(world.move_and_collide(mover, Vector2::from_f32(1.0, 0.0)).is_none());
        assert!(!world.move_and_slide(mover, Vector2::from_f32(1.0, 0.0)));
    }
}
