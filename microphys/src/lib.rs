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
//! # microphys
//!
//! A small 2D physics and collision core for games that run on both
//! microcontrollers and desktops.
//!
//! ## Features
//!
//! - **Three body kinds**: static, kinematic (explicit `move_and_slide`
//!   movement with floor/wall/ceiling flags) and rigid (gravity, forces,
//!   impulses)
//! - **Uniform-grid broad phase** with fixed-capacity buckets
//! - **Iterative relaxation** of dynamic and static contacts
//! - **No allocation in the frame loop**: every per-frame buffer is a
//!   `heapless` container sized by compile-time constants
//! - **Deterministic fixed point**: the `fixed-point` feature swaps `f32` for
//!   16.16 [`Fixed16`](math::Fixed16)
//! - **Parallelization**: optional Rayon integration for body updates
//!
//! ## Example
//!
//! ```rust
//! use microphys::body::Actor;
//! use microphys::collision::CollisionSystem;
//! use microphys::math::{scalar, Vector2};
//!
//! let mut world = CollisionSystem::new();
//! let player = world.add_entity(
//!     Actor::new_kinematic(0.0, 0.0, 10, 10).with_layer(1).with_mask(1),
//! );
//! world.add_entity(Actor::new_static(20.0, -50.0, 10, 100).with_layer(1).with_mask(1));
//!
//! world.move_and_slide(player, Vector2::from_f32(15.0, 0.0));
//! let player = world.get(player).unwrap();
//! assert!(player.is_on_wall());
//! assert!(player.position.x < scalar(10.0));
//! ```

#![warn(missing_docs)]

/// Scalar type, fixed-point numbers and 2D vectors
pub mod math;

/// Collision primitives and layer filtering
pub mod geometry;

/// Engine capacities and runtime tuning
pub mod config;

/// Configuration errors
pub mod error;

/// Generational actor storage
pub mod arena;

/// Actors and physics bodies
pub mod body;

/// Spatial grid broad phase
pub mod grid;

/// Per-frame collision pipeline
pub mod collision;

/// Kinematic movement
pub mod kinematic;

pub use arena::{ActorArena, ActorHandle};
pub use body::{Actor, BodyType, CollisionShape, PhysicsBody};
pub use collision::{CollisionHandler, CollisionSystem, FrameStats, NoCallbacks};
pub use config::PhysicsConfig;
pub use error::ConfigError;
pub use kinematic::KinematicCollision;
pub use math::{Scalar, Vector2};
