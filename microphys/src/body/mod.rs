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
//! Collidable actors and their physics bodies
//!
//! An [`Actor`] is anything with a hit box and a collision layer. Attaching a
//! [`PhysicsBody`] turns it into one of three body kinds:
//!
//! | Kind                    | Integrated | Moved by relaxation | Grid |
//! |-------------------------|------------|---------------------|------|
//! | [`BodyType::Static`]    | no         | never               | no   |
//! | [`BodyType::Kinematic`] | no         | never               | yes  |
//! | [`BodyType::Rigid`]     | every frame| yes                 | yes  |
//!
//! Actors without a body are plain collidables: they receive collision
//! callbacks and block kinematic movement but are never pushed around.
//!
//! The body kind is fixed at construction.

mod bounds;
mod rigid;

pub use bounds::{LimitRect, WorldCollisionInfo};

use crate::config::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::geometry::{layers, Circle, CollisionLayer, Rect};
use crate::math::{Real, Scalar, Vector2};

/// Physics body kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyType {
    /// Immovable; resolved as the final arbiter against moving bodies
    Static,
    /// Moved explicitly through `move_and_collide` / `move_and_slide`
    Kinematic,
    /// Driven by gravity, forces and impulses; pushed out by relaxation
    Rigid,
}

/// Narrow-phase shape of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionShape {
    /// The actor's hit box
    #[default]
    Aabb,
    /// Circle inscribed at the hit box's top-left corner
    Circle,
}

/// Surface contacts found by the last `move_and_slide`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactFlags {
    /// Touched a surface whose normal points up
    pub on_floor: bool,
    /// Touched a surface whose normal points down
    pub on_ceiling: bool,
    /// Touched a surface that is neither floor nor ceiling
    pub on_wall: bool,
}

/// Physical state attached to an [`Actor`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsBody {
    body_type: BodyType,
    /// Narrow-phase shape
    pub shape: CollisionShape,
    /// Radius used when `shape` is [`CollisionShape::Circle`]
    pub radius: Scalar,
    /// Linear velocity in units per second
    pub velocity: Vector2,
    /// Force accumulated since the last integration step
    pub force: Vector2,
    /// Fraction of normal velocity kept after a bounce
    pub restitution: Scalar,
    /// Linear damping coefficient per second
    pub friction: Scalar,
    /// Mass; non-positive mass ignores forces and impulses
    pub mass: Scalar,
    /// Multiplier on world gravity
    pub gravity_scale: Scalar,
    /// Reflect velocity on contact instead of sliding
    pub bounce: bool,
    /// Play-area limits; `None` leaves the body unbounded
    pub limits: Option<LimitRect>,
    /// Fallback right limit when `limits.right` is unset
    pub world_width: i32,
    /// Fallback bottom limit when `limits.bottom` is unset
    pub world_height: i32,
    /// Sides of the play area touched during the last update
    pub world_collision: WorldCollisionInfo,
    /// Contacts from the last `move_and_slide`
    pub contacts: ContactFlags,
}

impl PhysicsBody {
    /// Create a body of the given kind with default material values
    pub fn new(body_type: BodyType) -> Self {
        PhysicsBody {
            body_type,
            shape: CollisionShape::Aabb,
            radius: Scalar::ZERO,
            velocity: Vector2::ZERO,
            force: Vector2::ZERO,
            restitution: Scalar::ONE,
            friction: Scalar::ZERO,
            mass: Scalar::ONE,
            gravity_scale: Scalar::ONE,
            bounce: false,
            limits: None,
            world_width: LOGICAL_WIDTH,
            world_height: LOGICAL_HEIGHT,
            world_collision: WorldCollisionInfo::default(),
            contacts: ContactFlags::default(),
        }
    }

    /// Body kind
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Shorthand for `body_type() == BodyType::Static`
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Shorthand for `body_type() == BodyType::Rigid`
    pub fn is_rigid(&self) -> bool {
        self.body_type == BodyType::Rigid
    }

    /// Shorthand for `body_type() == BodyType::Kinematic`
    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }
}

/// A collidable object
///
/// # Examples
///
/// ```
/// use microphys::body::{Actor, BodyType};
///
/// let ball = Actor::new_rigid(10.0, 10.0, 8, 8)
///     .with_layer(0b01)
///     .with_mask(0b10)
///     .with_circle(4.0)
///     .with_bounce(true);
/// assert_eq!(ball.body_type(), Some(BodyType::Rigid));
/// assert!(ball.is_physics_body());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    /// Top-left corner of the hit box
    pub position: Vector2,
    /// Hit box width
    pub width: i32,
    /// Hit box height
    pub height: i32,
    /// Layers this actor belongs to
    pub layer: CollisionLayer,
    /// Layers this actor interacts with
    pub mask: CollisionLayer,
    /// Disabled actors are skipped by detection and queries
    pub enabled: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) query_stamp: u32,
    /// Physics state; `None` for plain collidables
    pub body: Option<PhysicsBody>,
}

impl Actor {
    /// Create a plain collidable with no physics body
    ///
    /// Layer and mask start at [`layers::NONE`], so the actor collides with
    /// nothing until gameplay code assigns them.
    pub fn new(x: f32, y: f32, width: i32, height: i32) -> Self {
        Actor::at(Vector2::from_f32(x, y), width, height)
    }

    /// Create a plain collidable from a position vector
    pub fn at(position: Vector2, width: i32, height: i32) -> Self {
        Actor {
            position,
            width,
            height,
            layer: layers::NONE,
            mask: layers::NONE,
            enabled: true,
            query_stamp: 0,
            body: None,
        }
    }

    /// Create an actor with a physics body of the given kind
    pub fn with_body_type(position: Vector2, width: i32, height: i32, body_type: BodyType) -> Self {
        let mut actor = Actor::at(position, width, height);
        actor.body = Some(PhysicsBody::new(body_type));
        actor
    }

    /// Create a static body
    pub fn new_static(x: f32, y: f32, width: i32, height: i32) -> Self {
        Actor::with_body_type(Vector2::from_f32(x, y), width, height, BodyType::Static)
    }

    /// Create a kinematic body
    pub fn new_kinematic(x: f32, y: f32, width: i32, height: i32) -> Self {
        Actor::with_body_type(Vector2::from_f32(x, y), width, height, BodyType::Kinematic)
    }

    /// Create a rigid body
    pub fn new_rigid(x: f32, y: f32, width: i32, height: i32) -> Self {
        Actor::with_body_type(Vector2::from_f32(x, y), width, height, BodyType::Rigid)
    }

    /// Set the collision layer
    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.layer = layer;
        self
    }

    /// Set the collision mask
    pub fn with_mask(mut self, mask: CollisionLayer) -> Self {
        self.mask = mask;
        self
    }

    /// Use a circle of `radius` as the narrow-phase shape
    ///
    /// The hit box is resized to the circle's bounding square so the grid
    /// sees the whole circle. No effect on plain collidables.
    pub fn with_circle(mut self, radius: f32) -> Self {
        if let Some(body) = self.body.as_mut() {
            let r = Scalar::from_f32(radius);
            body.shape = CollisionShape::Circle;
            body.radius = r;
            let diameter = Real::to_i32(r + r + Scalar::ONE - <Scalar as Real>::EPSILON);
            self.width = diameter;
            self.height = diameter;
        }
        self
    }

    /// Set the bounce flag
    pub fn with_bounce(mut self, bounce: bool) -> Self {
        if let Some(body) = self.body.as_mut() {
            body.bounce = bounce;
        }
        self
    }

    /// Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        if let Some(body) = self.body.as_mut() {
            body.restitution = Scalar::from_f32(restitution);
        }
        self
    }

    /// Set linear damping
    pub fn with_friction(mut self, friction: f32) -> Self {
        if let Some(body) = self.body.as_mut() {
            body.friction = Scalar::from_f32(friction);
        }
        self
    }

    /// Set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        if let Some(body) = self.body.as_mut() {
            body.mass = Scalar::from_f32(mass);
        }
        self
    }

    /// Set the gravity multiplier
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        if let Some(body) = self.body.as_mut() {
            body.gravity_scale = Scalar::from_f32(scale);
        }
        self
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.set_velocity(velocity);
        self
    }

    /// Clamp the body into `limits` after each integration step
    pub fn with_limits(mut self, limits: LimitRect) -> Self {
        if let Some(body) = self.body.as_mut() {
            body.limits = Some(limits);
        }
        self
    }

    /// Axis-aligned hit box
    #[inline]
    pub fn hit_box(&self) -> Rect {
        Rect::new(self.position, self.width, self.height)
    }

    /// Narrow-phase circle, if the body uses one
    pub fn circle(&self) -> Option<Circle> {
        let body = self.body.as_ref()?;
        if body.shape != CollisionShape::Circle {
            return None;
        }
        Some(Circle::new(
            self.position.x + body.radius,
            self.position.y + body.radius,
            body.radius,
        ))
    }

    /// Narrow-phase shape; plain collidables are boxes
    pub fn shape(&self) -> CollisionShape {
        self.body.as_ref().map(|b| b.shape).unwrap_or_default()
    }

    /// Body kind, or `None` for plain collidables
    pub fn body_type(&self) -> Option<BodyType> {
        self.body.as_ref().map(|b| b.body_type)
    }

    /// Whether a physics body is attached
    pub fn is_physics_body(&self) -> bool {
        self.body.is_some()
    }

    /// Whether this actor is a static body
    pub fn is_static(&self) -> bool {
        self.body.as_ref().is_some_and(PhysicsBody::is_static)
    }

    /// Whether this actor is a rigid body
    pub fn is_rigid(&self) -> bool {
        self.body.as_ref().is_some_and(PhysicsBody::is_rigid)
    }

    /// Current velocity; zero for plain collidables
    pub fn velocity(&self) -> Vector2 {
        self.body.as_ref().map_or(Vector2::ZERO, |b| b.velocity)
    }

    /// Set velocity; ignored by plain collidables
    pub fn set_velocity(&mut self, velocity: Vector2) {
        if let Some(body) = self.body.as_mut() {
            body.velocity = velocity;
        }
    }

    /// Sides of the play area touched during the last update
    pub fn world_collision(&self) -> WorldCollisionInfo {
        self.body
            .as_ref()
            .map(|b| b.world_collision)
            .unwrap_or_default()
    }

    /// Standing on a floor after the last `move_and_slide`
    pub fn is_on_floor(&self) -> bool {
        self.body.as_ref().is_some_and(|b| b.contacts.on_floor)
    }

    /// Touching a ceiling after the last `move_and_slide`
    pub fn is_on_ceiling(&self) -> bool {
        self.body.as_ref().is_some_and(|b| b.contacts.on_ceiling)
    }

    /// Touching a wall after the last `move_and_slide`
    pub fn is_on_wall(&self) -> bool {
        self.body.as_ref().is_some_and(|b| b.contacts.on_wall)
    }
}
