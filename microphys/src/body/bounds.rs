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
//! Play-area limits for bounded bodies

use super::PhysicsBody;
use crate::config::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::math::{Real, Scalar, Vector2};

/// Play-area boundaries in world units
///
/// Unset sides fall back to `0` for left/top and to the body's world size
/// for right/bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimitRect {
    /// Left boundary
    pub left: Option<i32>,
    /// Top boundary
    pub top: Option<i32>,
    /// Right boundary
    pub right: Option<i32>,
    /// Bottom boundary
    pub bottom: Option<i32>,
}

impl LimitRect {
    /// Limits on all four sides
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        LimitRect {
            left: Some(left),
            top: Some(top),
            right: Some(right),
            bottom: Some(bottom),
        }
    }

    /// Limits that use the world edges on every side
    pub fn world() -> Self {
        LimitRect::default()
    }
}

/// Which play-area sides a body touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldCollisionInfo {
    /// Hit the left boundary
    pub left: bool,
    /// Hit the right boundary
    pub right: bool,
    /// Hit the top boundary
    pub top: bool,
    /// Hit the bottom boundary
    pub bottom: bool,
}

impl WorldCollisionInfo {
    /// Whether any side was touched
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

impl PhysicsBody {
    /// Clamp a `width x height` box at `position` into the play area
    ///
    /// Each side hit reverses the matching velocity component, scaled by
    /// restitution, and is recorded in `world_collision`. The record is reset
    /// on every call. Unbounded bodies only get the reset.
    pub(crate) fn resolve_world_bounds(&mut self, position: &mut Vector2, width: i32, height: i32) {
        self.world_collision = WorldCollisionInfo::default();

        let Some(limits) = self.limits else {
            return;
        };

        let world_w = if self.world_width > 0 {
            self.world_width
        } else {
            LOGICAL_WIDTH
        };
        let world_h = if self.world_height > 0 {
            self.world_height
        } else {
            LOGICAL_HEIGHT
        };

        let left = Scalar::from_i32(limits.left.unwrap_or(0));
        let top = Scalar::from_i32(limits.top.unwrap_or(0));
        let right = Scalar::from_i32(limits.right.unwrap_or(world_w));
        let bottom = Scalar::from_i32(limits.bottom.unwrap_or(world_h));
        let w = Scalar::from_i32(width);
        let h = Scalar::from_i32(height);

        if position.x < left {
            position.x = left;
            self.velocity.x = -self.velocity.x * self.restitution;
            self.world_collision.left = true;
        }
        if position.x + w > right {
            position.x = right - w;
            self.velocity.x = -self.velocity.x * self.restitution;
            self.world_collision.right = true;
        }
        if position.y < top {
            position.y = top;
            self.velocity.y = -self.velocity.y * self.restitution;
            self.world_collision.top = true;
        }
        if position.y + h > bottom {
            position.y = bottom - h;
            self.velocity.y = -self.velocity.y * self.restitution;
            self.world_collision.bottom = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyType;
    use crate::math::scalar;

    fn bounded(limits: LimitRect) -> PhysicsBody {
        let mut body = PhysicsBody::new(BodyType::Rigid);
        body.limits = Some(limits);
        body
    }

    #[test]
    fn test_unbounded_body_is_untouched() {
        let mut body = PhysicsBody::new(BodyType::Rigid);
        body.velocity = Vector2::from_f32(-5.0, 0.0);
        let mut pos = Vector2::from_f32(-100.0, 0.0);
        body.resolve_world_bounds(&mut pos, 10, 10);
        assert_eq!(pos, Vector2::from_f32(-100.0, 0.0));
        assert!(!body.world_collision.any());
    }

    #[test]
    fn test_left_hit_reflects_with_restitution() {
        let mut body = bounded(LimitRect::new(0, 0, 100, 100));
        body.restitution = scalar(0.5);
        body.velocity = Vector2::from_f32(-10.0, 3.0);
        let mut pos = Vector2::from_f32(-2.0, 50.0);
        body.resolve_world_bounds(&mut pos, 10, 10);

        assert_eq!(pos.x, scalar(0.0));
        assert_eq!(body.velocity, Vector2::from_f32(5.0, 3.0));
        assert!(body.world_collision.left);
        assert!(!body.world_collision.right);
    }

    #[test]
    fn test_unset_sides_use_world_size() {
        let mut body = bounded(LimitRect::world());
        body.world_width = 64;
        body.world_height = 32;
        body.velocity = Vector2::from_f32(4.0, 4.0);
        let mut pos = Vector2::from_f32(60.0, 30.0);
        body.resolve_world_bounds(&mut pos, 8, 8);

        assert_eq!(pos, Vector2::from_f32(56.0, 24.0));
        assert_eq!(body.velocity, Vector2::from_f32(-4.0, -4.0));
        assert!(body.world_collision.right);
        assert!(body.world_collision.bottom);
    }

    #[test]
    fn test_info_resets_each_call() {
        let mut body = bounded(LimitRect::new(0, 0, 100, 100));
        let mut pos = Vector2::from_f32(0.0, -1.0);
        body.resolve_world_bounds(&mut pos, 10, 10);
        assert!(body.world_collision.top);

        let mut inside = Vector2::from_f32(50.0, 50.0);
        body.resolve_world_bounds(&mut inside, 10, 10);
        assert!(!body.world_collision.any());
    }
}
