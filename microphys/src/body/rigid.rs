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
//! Rigid body integration
//!
//! Semi-implicit Euler, one step per frame:
//!
//! ```text
//! F.y += g * gravity_scale * m
//! v   += (F / m) * dt          (skipped when m <= 0)
//! x   += v * dt
//! F    = 0
//! v   *= max(1 - friction * dt, 0)
//! ```
//!
//! Velocity is updated before position, so the position step already sees
//! this frame's acceleration. The collision pass runs afterwards and has the
//! final say on position.

use super::{Actor, PhysicsBody};
use crate::config::DEFAULT_GRAVITY;
use crate::math::{millis_to_seconds, Real, Scalar, Vector2};

impl PhysicsBody {
    /// Accumulate a force until the next integration step
    pub fn apply_force(&mut self, force: Vector2) {
        self.force += force;
    }

    /// Change velocity by `impulse / mass`; ignored when `mass <= 0`
    pub fn apply_impulse(&mut self, impulse: Vector2) {
        if self.mass > Scalar::ZERO {
            self.velocity += impulse / self.mass;
        }
    }

    /// Advance velocity and `position` by one step
    pub(crate) fn integrate(&mut self, position: &mut Vector2, dt: Scalar, gravity: Scalar) {
        self.force.y += gravity * self.gravity_scale * self.mass;

        if self.mass > Scalar::ZERO {
            let acceleration = self.force / self.mass;
            self.velocity += acceleration * dt;
        }

        *position += self.velocity * dt;
        self.force = Vector2::ZERO;

        let damping = Real::max(Scalar::ONE - self.friction * dt, Scalar::ZERO);
        self.velocity *= damping;
    }
}

impl Actor {
    /// Per-frame update driven by the game loop
    ///
    /// Rigid bodies integrate with the default world gravity; static,
    /// kinematic and plain actors are left untouched.
    pub fn update(&mut self, delta_ms: u32) {
        let gravity = Scalar::from_f32(DEFAULT_GRAVITY);
        self.integrate(millis_to_seconds(delta_ms), gravity);
    }

    /// Integrate a rigid body by `dt` seconds under `gravity`
    ///
    /// Bodies with limits are clamped back into the play area afterwards.
    /// No-op for anything but rigid bodies.
    pub fn integrate(&mut self, dt: Scalar, gravity: Scalar) {
        let Some(body) = self.body.as_mut() else {
            return;
        };
        if !body.is_rigid() {
            return;
        }
        body.integrate(&mut self.position, dt, gravity);
        body.resolve_world_bounds(&mut self.position, self.width, self.height);
    }

    /// Accumulate a force on a rigid body
    pub fn apply_force(&mut self, force: Vector2) {
        if let Some(body) = self.body.as_mut().filter(|b| b.is_rigid()) {
            body.apply_force(force);
        }
    }

    /// Apply an impulse to a rigid body
    pub fn apply_impulse(&mut self, impulse: Vector2) {
        if let Some(body) = self.body.as_mut().filter(|b| b.is_rigid()) {
            body.apply_impulse(impulse);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyType, LimitRect};
    use crate::math::scalar;

    fn close(a: Scalar, b: f32) -> bool {
        (a.to_f32() - b).abs() < 0.01
    }

    #[test]
    fn test_gravity_step_is_semi_implicit() {
        let mut actor = Actor::new_rigid(0.0, 0.0, 10, 10);
        actor.integrate(scalar(0.5), scalar(200.0));

        // v = 200 * 0.5 = 100, x = 100 * 0.5 = 50
        assert!(close(actor.velocity().y, 100.0));
        assert!(close(actor.position.y, 50.0));
        assert_eq!(actor.body.as_ref().map(|b| b.force), Some(Vector2::ZERO));
    }

    #[test]
    fn test_static_update_never_moves() {
        let mut wall = Actor::new_static(5.0, 5.0, 10, 10)
            .with_velocity(Vector2::from_f32(100.0, 100.0));
        for _ in 0..10 {
            wall.update(16);
        }
        assert_eq!(wall.position, Vector2::from_f32(5.0, 5.0));
    }

    #[test]
    fn test_kinematic_and_plain_are_not_integrated() {
        let mut k = Actor::new_kinematic(0.0, 0.0, 4, 4).with_velocity(Vector2::from_f32(5.0, 0.0));
        let mut plain = Actor::new(0.0, 0.0, 4, 4);
        k.update(100);
        plain.update(100);
        assert_eq!(k.position, Vector2::ZERO);
        assert_eq!(plain.position, Vector2::ZERO);
    }

    #[test]
    fn test_friction_damps_velocity() {
        let mut actor = Actor::new_rigid(0.0, 0.0, 4, 4)
            .with_gravity_scale(0.0)
            .with_friction(1.0)
            .with_velocity(Vector2::from_f32(10.0, 0.0));
        actor.integrate(scalar(0.5), scalar(200.0));
        assert!(close(actor.velocity().x, 5.0));

        let mut heavy = Actor::new_rigid(0.0, 0.0, 4, 4)
            .with_gravity_scale(0.0)
            .with_friction(10.0)
            .with_velocity(Vector2::from_f32(10.0, 0.0));
        heavy.integrate(scalar(0.5), scalar(200.0));
        assert_eq!(heavy.velocity(), Vector2::ZERO);
    }

    #[test]
    fn test_forces_and_impulses() {
        let mut actor = Actor::new_rigid(0.0, 0.0, 4, 4)
            .with_mass(2.0)
            .with_gravity_scale(0.0);
        actor.apply_impulse(Vector2::from_f32(4.0, 0.0));
        assert_eq!(actor.velocity(), Vector2::from_f32(2.0, 0.0));

        actor.apply_force(Vector2::from_f32(0.0, 8.0));
        actor.integrate(scalar(1.0), scalar(0.0));
        assert!(close(actor.velocity().y, 4.0));
    }

    #[test]
    fn test_massless_body_ignores_impulse() {
        let mut actor = Actor::new_rigid(0.0, 0.0, 4, 4).with_mass(0.0);
        actor.apply_impulse(Vector2::from_f32(100.0, 0.0));
        assert_eq!(actor.velocity(), Vector2::ZERO);

        actor.integrate(scalar(1.0), scalar(200.0));
        assert_eq!(actor.velocity(), Vector2::ZERO);
        assert!(actor.velocity().x.to_f32().is_finite());
    }

    #[test]
    fn test_bounded_body_is_clamped_after_integration() {
        let mut actor = Actor::new_rigid(0.0, 90.0, 10, 10)
            .with_limits(LimitRect::new(0, 0, 100, 100))
            .with_velocity(Vector2::from_f32(0.0, 50.0));
        actor.integrate(scalar(0.5), scalar(0.0));

        assert_eq!(actor.position.y, scalar(90.0));
        assert!(actor.world_collision().bottom);
        assert!(close(actor.velocity().y, -50.0));
        assert_eq!(actor.body_type(), Some(BodyType::Rigid));
    }
}
