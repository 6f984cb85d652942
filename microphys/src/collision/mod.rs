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
//! Per-frame collision pipeline
//!
//! [`CollisionSystem::update_with`] runs four ordered phases:
//!
//! 1. **Grid build**: every enabled, non-static actor is inserted into the
//!    [`SpatialGrid`].
//! 2. **Dynamic detection**: each actor queries the grid; candidate pairs
//!    are visited once (lower handle first), filtered by layer/mask and
//!    tested with the narrow phase. Overlaps notify both actors, and pairs
//!    of physics bodies are recorded for relaxation.
//! 3. **Static detection**: every non-static physics body is tested
//!    directly against every static body. Statics never enter the grid.
//! 4. **Relaxation**: `relaxation_iterations` passes re-resolve the
//!    recorded dynamic pairs, then the static pairs, so static bodies get
//!    the final word.
//!
//! Pair lists and the grid are fixed-capacity; overflow is counted in
//! [`FrameStats`] and logged at `debug` level, never reallocated.
//!
//! Integration is a separate step ([`CollisionSystem::update_bodies`]) so the
//! frame driver decides the order; [`CollisionSystem::step`] does both.

mod narrow;
mod response;
mod stats;

pub use narrow::{aabb_aabb, contact, overlaps, Contact};
pub use response::apply_response;
pub use stats::FrameStats;

use heapless::Vec as FixedVec;
use log::{debug, trace, warn};

use crate::arena::{ActorArena, ActorHandle};
use crate::body::Actor;
use crate::config::{PhysicsConfig, MAX_POTENTIAL_COLLIDERS, PHYSICS_MAX_PAIRS};
use crate::error::ConfigError;
use crate::geometry::layers_interact;
use crate::grid::{QueryToken, SpatialGrid};
use crate::math::{millis_to_seconds, Scalar};

type PairList = FixedVec<(ActorHandle, ActorHandle), PHYSICS_MAX_PAIRS>;

/// Receiver for overlap notifications
///
/// Called once per direction for every overlapping pair: `(actor, other)`
/// and then `(other, actor)`, in no guaranteed order. The handler gets the
/// whole arena and may change anything, including disabling or removing
/// actors; those changes are seen by pairs checked later in the same pass.
pub trait CollisionHandler {
    /// `actor` overlapped `other` this frame
    fn on_collision(&mut self, arena: &mut ActorArena, actor: ActorHandle, other: ActorHandle);
}

impl<F> CollisionHandler for F
where
    F: FnMut(&mut ActorArena, ActorHandle, ActorHandle),
{
    fn on_collision(&mut self, arena: &mut ActorArena, actor: ActorHandle, other: ActorHandle) {
        self(arena, actor, other)
    }
}

/// Handler that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl CollisionHandler for NoCallbacks {
    fn on_collision(&mut self, _arena: &mut ActorArena, _actor: ActorHandle, _other: ActorHandle) {}
}

/// Owner of all collidable actors and the per-frame pipeline
///
/// # Examples
///
/// ```
/// use microphys::body::Actor;
/// use microphys::collision::CollisionSystem;
///
/// let mut world = CollisionSystem::new();
/// let floor = world.add_entity(
///     Actor::new_static(-50.0, 20.0, 100, 10).with_layer(1).with_mask(1),
/// );
/// let crate_ = world.add_entity(
///     Actor::new_rigid(0.0, 0.0, 10, 10).with_layer(1).with_mask(1),
/// );
///
/// for _ in 0..120 {
///     world.update_bodies(16);
///     world.update();
/// }
///
/// let y = world.get(crate_).map(|a| a.position.y);
/// assert!(y.is_some());
/// assert!(world.contains(floor));
/// ```
pub struct CollisionSystem {
    arena: ActorArena,
    grid: SpatialGrid,
    config: PhysicsConfig,
    gravity: Scalar,
    floor_threshold: Scalar,
    token: QueryToken,
    pairs: PairList,
    static_pairs: PairList,
    stats: FrameStats,
}

impl CollisionSystem {
    /// Create a system with the default configuration
    pub fn new() -> Self {
        Self::build(PhysicsConfig::default())
    }

    /// Create a system with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is rejected.
    pub fn with_config(config: PhysicsConfig) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            warn!("rejected physics config: {}", err);
            return Err(err);
        }
        Ok(Self::build(config))
    }

    fn build(config: PhysicsConfig) -> Self {
        CollisionSystem {
            arena: ActorArena::with_capacity(config.actor_capacity),
            grid: SpatialGrid::new(),
            gravity: config.gravity_scalar(),
            floor_threshold: config.floor_threshold_scalar(),
            config,
            token: QueryToken::new(),
            pairs: PairList::new(),
            static_pairs: PairList::new(),
            stats: FrameStats::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub(crate) fn floor_threshold(&self) -> Scalar {
        self.floor_threshold
    }

    /// Register an actor and return its handle
    ///
    /// Physics bodies adopt the configured world size as their fallback
    /// play-area limits.
    pub fn add_entity(&mut self, mut actor: Actor) -> ActorHandle {
        if let Some(body) = actor.body.as_mut() {
            body.world_width = self.config.world_width;
            body.world_height = self.config.world_height;
        }
        self.arena.insert(actor)
    }

    /// Unregister an actor, returning it
    pub fn remove_entity(&mut self, handle: ActorHandle) -> Option<Actor> {
        self.arena.remove(handle)
    }

    /// Whether the handle refers to a registered actor
    pub fn contains(&self, handle: ActorHandle) -> bool {
        self.arena.contains(handle)
    }

    /// Borrow an actor
    pub fn get(&self, handle: ActorHandle) -> Option<&Actor> {
        self.arena.get(handle)
    }

    /// Mutably borrow an actor
    pub fn get_mut(&mut self, handle: ActorHandle) -> Option<&mut Actor> {
        self.arena.get_mut(handle)
    }

    /// All registered actors
    pub fn actors(&self) -> &ActorArena {
        &self.arena
    }

    /// All registered actors, mutably
    pub fn actors_mut(&mut self) -> &mut ActorArena {
        &mut self.arena
    }

    /// Number of registered actors
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether no actors are registered
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Unregister every actor
    pub fn clear(&mut self) {
        self.arena.clear();
        self.grid.clear();
        self.pairs.clear();
        self.static_pairs.clear();
    }

    /// Counters from the last [`update`](Self::update)
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Broad-phase grid as built by the last update
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Integrate every enabled rigid body by `delta_ms` milliseconds
    ///
    /// With the `parallel` feature the bodies are integrated on the rayon
    /// thread pool; each body only touches its own state.
    pub fn update_bodies(&mut self, delta_ms: u32) {
        let dt = millis_to_seconds(delta_ms);
        let gravity = self.gravity;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.arena
                .par_actors_mut()
                .filter(|actor| actor.enabled)
                .for_each(|actor| actor.integrate(dt, gravity));
        }

        #[cfg(not(feature = "parallel"))]
        for actor in self.arena.actors_mut().filter(|actor| actor.enabled) {
            actor.integrate(dt, gravity);
        }
    }

    /// Run the collision pipeline without callbacks
    pub fn update(&mut self) {
        self.update_with(&mut NoCallbacks);
    }

    /// Integrate bodies, then run the collision pipeline
    pub fn step<H: CollisionHandler>(&mut self, delta_ms: u32, handler: &mut H) {
        self.update_bodies(delta_ms);
        self.update_with(handler);
    }

    /// Run the collision pipeline, routing overlaps to `handler`
    pub fn update_with<H: CollisionHandler>(&mut self, handler: &mut H) {
        self.stats.reset();
        self.pairs.clear();
        self.static_pairs.clear();

        self.build_grid();
        self.detect_dynamic(handler);
        self.detect_static(handler);
        self.relax();

        if self.stats.has_drops() {
            debug!(
                "collision frame dropped work: {} cell insertions, {} truncated queries, {} pairs, {} static pairs",
                self.stats.dropped_cell_insertions,
                self.stats.truncated_queries,
                self.stats.dropped_pairs,
                self.stats.dropped_static_pairs
            );
        }
        trace!(
            "collision frame: {} actors, {} pairs, {} static pairs, {} callbacks",
            self.arena.len(),
            self.stats.pairs,
            self.stats.static_pairs,
            self.stats.callbacks
        );
    }

    fn build_grid(&mut self) {
        self.grid.clear();

        for (handle, actor) in self.arena.iter() {
            if !actor.enabled || actor.is_static() {
                continue;
            }
            self.stats.grid_insertions += 1;
            self.stats.dropped_cell_insertions += self.grid.insert(handle, actor);
        }
    }

    fn detect_dynamic<H: CollisionHandler>(&mut self, handler: &mut H) {
        let mut candidates: FixedVec<ActorHandle, MAX_POTENTIAL_COLLIDERS> = FixedVec::new();

        for index in 0..self.arena.slot_count() {
            let Some(a) = self.arena.handle_at(index) else {
                continue;
            };
            match self.arena.get(a) {
                Some(actor) if actor.enabled && !actor.is_static() => {}
                _ => continue,
            }

            let token = self.token.advance();
            if self
                .grid
                .potential_colliders(&mut self.arena, a, token, &mut candidates)
            {
                self.stats.truncated_queries += 1;
            }

            for &b in candidates.iter() {
                if b <= a || !self.pair_overlaps(a, b) {
                    continue;
                }
                self.notify(handler, a, b);

                if self.both_physics(a, b) {
                    if self.pairs.push((a, b)).is_err() {
                        self.stats.dropped_pairs += 1;
                    } else {
                        self.stats.pairs += 1;
                    }
                }
            }
        }
    }

    fn detect_static<H: CollisionHandler>(&mut self, handler: &mut H) {
        let slots = self.arena.slot_count();

        for i in 0..slots {
            let Some(dynamic) = self.arena.handle_at(i) else {
                continue;
            };
            match self.arena.get(dynamic) {
                Some(actor) if actor.is_physics_body() && !actor.is_static() => {}
                _ => continue,
            }

            for j in 0..slots {
                let Some(fixed) = self.arena.handle_at(j) else {
                    continue;
                };
                if !self.arena.get(fixed).is_some_and(Actor::is_static) {
                    continue;
                }
                if !self.pair_overlaps(dynamic, fixed) {
                    continue;
                }
                self.notify(handler, dynamic, fixed);

                if self.static_pairs.push((dynamic, fixed)).is_err() {
                    self.stats.dropped_static_pairs += 1;
                } else {
                    self.stats.static_pairs += 1;
                }
            }
        }
    }

    fn relax(&mut self) {
        for _ in 0..self.config.relaxation_iterations {
            for i in 0..self.pairs.len() {
                let (a, b) = self.pairs[i];
                self.resolve_pair(a, b);
            }
            for i in 0..self.static_pairs.len() {
                let (a, b) = self.static_pairs[i];
                self.resolve_pair(a, b);
            }
        }
    }

    fn resolve_pair(&mut self, a: ActorHandle, b: ActorHandle) {
        let Some((x, y)) = self.arena.get_pair_mut(a, b) else {
            return;
        };
        if !x.enabled || !y.enabled {
            return;
        }
        if let Some(contact) = narrow::contact(x, y) {
            response::apply_response(x, y, &contact);
        }
    }

    /// Both alive and enabled, layers interact and shapes overlap
    fn pair_overlaps(&self, a: ActorHandle, b: ActorHandle) -> bool {
        let (Some(x), Some(y)) = (self.arena.get(a), self.arena.get(b)) else {
            return false;
        };
        x.enabled
            && y.enabled
            && layers_interact(x.layer, x.mask, y.layer, y.mask)
            && narrow::overlaps(x, y)
    }

    fn both_physics(&self, a: ActorHandle, b: ActorHandle) -> bool {
        let is_body = |h| self.arena.get(h).is_some_and(Actor::is_physics_body);
        is_body(a) && is_body(b)
    }

    fn notify<H: CollisionHandler>(&mut self, handler: &mut H, a: ActorHandle, b: ActorHandle) {
        handler.on_collision(&mut self.arena, a, b);
        self.stats.callbacks += 1;
        if self.arena.contains(a) && self.arena.contains(b) {
            handler.on_collision(&mut self.arena, b, a);
            self.stats.callbacks += 1;
        }
    }

    /// Collect every enabled actor overlapping `handle`'s actor
    ///
    /// Ignores the grid, so it is safe to call between updates while actors
    /// are moving. Returns `true` if anything was found; collection stops
    /// when `out` is full.
    pub fn check_collision<const N: usize>(
        &self,
        handle: ActorHandle,
        out: &mut FixedVec<ActorHandle, N>,
    ) -> bool {
        out.clear();
        match self.arena.get(handle) {
            Some(actor) if actor.enabled => self.check_collision_at(actor, Some(handle), out),
            _ => false,
        }
    }

    /// Collect every enabled actor overlapping `query`
    ///
    /// `query` need not be registered; `exclude` is skipped, which lets a
    /// registered actor test a hypothetical position of itself.
    pub fn check_collision_at<const N: usize>(
        &self,
        query: &Actor,
        exclude: Option<ActorHandle>,
        out: &mut FixedVec<ActorHandle, N>,
    ) -> bool {
        out.clear();
        for (handle, other) in self.arena.iter() {
            if Some(handle) == exclude || !other.enabled {
                continue;
            }
            if !layers_interact(query.layer, query.mask, other.layer, other.mask) {
                continue;
            }
            if narrow::overlaps(query, other) && out.push(handle).is_err() {
                break;
            }
        }
        !out.is_empty()
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_ACTOR_CAPACITY, KINEMATIC_MAX_COLLISIONS};
    use crate::math::{Real, Vector2};

    const SOLID: u16 = 0b1;

    fn solid(actor: Actor) -> Actor {
        actor.with_layer(SOLID).with_mask(SOLID)
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let bad = PhysicsConfig::default().with_relaxation_iterations(0);
        assert!(matches!(
            CollisionSystem::with_config(bad),
            Err(ConfigError::ZeroRelaxationIterations)
        ));
        assert!(CollisionSystem::with_config(PhysicsConfig::default()).is_ok());
    }

    #[test]
    fn test_with_config_reserves_actor_slots() {
        let config = PhysicsConfig::default().with_actor_capacity(200);
        let world = match CollisionSystem::with_config(config) {
            Ok(world) => world,
            Err(err) => panic!("default config rejected: {}", err),
        };
        assert!(world.actors().capacity() >= 200);
        assert!(world.is_empty());

        assert!(CollisionSystem::new().actors().capacity() >= DEFAULT_ACTOR_CAPACITY);
    }

    #[test]
    fn test_callbacks_fire_both_ways() {
        let mut world = CollisionSystem::new();
        let a = world.add_entity(solid(Actor::new(0.0, 0.0, 10, 10)));
        let b = world.add_entity(solid(Actor::new(5.0, 5.0, 10, 10)));

        let mut seen = Vec::new();
        let mut handler = |_: &mut ActorArena, me: ActorHandle, other: ActorHandle| {
            seen.push((me, other));
        };
        world.update_with(&mut handler);

        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&(a, b)));
        assert!(seen.contains(&(b, a)));
        assert_eq!(world.stats().callbacks, 2);
        // Plain actors are notified but never relaxed
        assert_eq!(world.stats().pairs, 0);
        assert_eq!(world.get(a).map(|x| x.position), Some(Vector2::ZERO));
    }

    #[test]
    fn test_layer_mask_filtering() {
        let mut world = CollisionSystem::new();
        // One-sided mask is enough
        world.add_entity(Actor::new(0.0, 0.0, 10, 10).with_layer(0b01).with_mask(0b10));
        world.add_entity(Actor::new(5.0, 0.0, 10, 10).with_layer(0b10).with_mask(0));
        // Neither side matches
        world.add_entity(Actor::new(100.0, 100.0, 10, 10).with_layer(0b01).with_mask(0b01));
        world.add_entity(Actor::new(105.0, 100.0, 10, 10).with_layer(0b10).with_mask(0b10));

        let mut count = 0;
        world.update_with(&mut |_: &mut ActorArena, _: ActorHandle, _: ActorHandle| count += 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_disabled_actors_are_skipped() {
        let mut world = CollisionSystem::new();
        world.add_entity(solid(Actor::new_rigid(0.0, 0.0, 10, 10)));
        let b = world.add_entity(solid(Actor::new_rigid(5.0, 0.0, 10, 10)));
        if let Some(actor) = world.get_mut(b) {
            actor.enabled = false;
        }

        world.update();
        assert_eq!(world.stats().callbacks, 0);
        assert_eq!(world.stats().grid_insertions, 1);
    }

    #[test]
    fn test_callback_can_disable_later_pairs() {
        let mut world = CollisionSystem::new();
        let brick = world.add_entity(solid(Actor::new(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new(5.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new(0.0, 5.0, 10, 10)));

        let mut hits = 0;
        world.update_with(&mut |arena: &mut ActorArena, me: ActorHandle, _: ActorHandle| {
            if me == brick {
                hits += 1;
                if let Some(actor) = arena.get_mut(me) {
                    actor.mask = 0;
                    actor.layer = 0;
                }
            }
        });
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_static_pairs_are_resolved() {
        let mut world = CollisionSystem::new();
        let body = world.add_entity(solid(Actor::new_rigid(0.0, 2.0, 10, 10)));
        world.add_entity(solid(Actor::new_static(-50.0, 10.0, 100, 10)));

        world.update();

        assert_eq!(world.stats().static_pairs, 1);
        assert_eq!(world.stats().callbacks, 2);
        let pos = world.get(body).map(|a| a.position);
        assert_eq!(pos, Some(Vector2::from_f32(0.0, 0.0)));
    }

    #[test]
    fn test_statics_stay_out_of_the_grid() {
        let mut world = CollisionSystem::new();
        world.add_entity(solid(Actor::new_static(0.0, 0.0, 10, 10)));
        world.add_entity(solid(Actor::new_static(5.0, 0.0, 10, 10)));
        world.update();
        assert_eq!(world.stats().grid_insertions, 0);
        assert_eq!(world.stats().callbacks, 0);
    }

    #[test]
    fn test_pair_overflow_is_counted() {
        let mut world = CollisionSystem::new();
        // 20 overlapping rigid bodies in one cell: 190 pairs > capacity
        for _ in 0..20 {
            world.add_entity(solid(Actor::new_rigid(4.0, 4.0, 8, 8)));
        }
        world.update();

        let stats = world.stats();
        assert_eq!(stats.pairs, PHYSICS_MAX_PAIRS);
        assert_eq!(stats.dropped_pairs, 190 - PHYSICS_MAX_PAIRS);
        assert!(stats.has_drops());
    }

    #[test]
    fn test_check_collision_ignores_self_and_disabled() {
        let mut world = CollisionSystem::new();
        let me = world.add_entity(solid(Actor::new_kinematic(0.0, 0.0, 10, 10)));
        let wall = world.add_entity(solid(Actor::new_static(5.0, 0.0, 10, 10)));
        let off = world.add_entity(solid(Actor::new_static(0.0, 5.0, 10, 10)));
        if let Some(actor) = world.get_mut(off) {
            actor.enabled = false;
        }

        let mut out: FixedVec<ActorHandle, KINEMATIC_MAX_COLLISIONS> = FixedVec::new();
        assert!(world.check_collision(me, &mut out));
        assert_eq!(out.as_slice(), &[wall]);

        let far = solid(Actor::new(200.0, 200.0, 4, 4));
        assert!(!world.check_collision_at(&far, None, &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn test_update_bodies_uses_configured_gravity() {
        let config = PhysicsConfig::default().with_gravity(100.0);
        let mut world = CollisionSystem::with_config(config).expect("valid config");
        let body = world.add_entity(Actor::new_rigid(0.0, 0.0, 4, 4));
        let wall = world.add_entity(Actor::new_static(50.0, 50.0, 4, 4));

        world.update_bodies(500);

        let v = world.get(body).map(|a| a.velocity().y.to_f32());
        assert!(v.is_some_and(|v| (v - 50.0).abs() < 0.01));
        assert_eq!(
            world.get(wall).map(|a| a.position),
            Some(Vector2::from_f32(50.0, 50.0))
        );
    }

    #[test]
    fn test_removed_actor_handle_is_stale() {
        let mut world = CollisionSystem::new();
        let a = world.add_entity(Actor::new(0.0, 0.0, 1, 1));
        assert!(world.remove_entity(a).is_some());
        assert!(!world.contains(a));
        assert!(world.get(a).is_none());
        assert!(world.is_empty());
    }
}
