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
//! Collision primitives and layer filtering
//!
//! Shapes here are pure values: [`Rect`] for axis-aligned boxes, [`Circle`]
//! for round bodies and [`Segment`] for ray-style queries. The overlap tests
//! are the building blocks of the narrow phase.
//!
//! # Boundary conventions
//!
//! - `Rect::intersects` is **half-open**: boxes that merely share an edge do
//!   not overlap. A body pushed exactly onto a surface therefore stops
//!   colliding with it.
//! - Circle tests are **closed**: `distance == r1 + r2` counts as touching.

use crate::math::{Real, Scalar, Vector2};

/// 16-bit collision layer bitmask
pub type CollisionLayer = u16;

/// Common layer values
pub mod layers {
    use super::CollisionLayer;

    /// Matches nothing
    pub const NONE: CollisionLayer = 0;
    /// Matches everything
    pub const ALL: CollisionLayer = 0xFFFF;
}

/// Whether two layer/mask pairs interact
///
/// A pair interacts when *either* side's mask selects the other's layer.
/// Both directions are not required.
#[inline]
pub fn layers_interact(
    a_layer: CollisionLayer,
    a_mask: CollisionLayer,
    b_layer: CollisionLayer,
    b_mask: CollisionLayer,
) -> bool {
    (a_mask & b_layer) != 0 || (b_mask & a_layer) != 0
}

/// Axis-aligned rectangle with integer size
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Top-left corner
    pub position: Vector2,
    /// Width in world units
    pub width: i32,
    /// Height in world units
    pub height: i32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size
    pub fn new(position: Vector2, width: i32, height: i32) -> Self {
        Rect {
            position,
            width,
            height,
        }
    }

    /// Left edge
    #[inline]
    pub fn left(&self) -> Scalar {
        self.position.x
    }

    /// Top edge
    #[inline]
    pub fn top(&self) -> Scalar {
        self.position.y
    }

    /// Right edge (exclusive)
    #[inline]
    pub fn right(&self) -> Scalar {
        self.position.x + Scalar::from_i32(self.width)
    }

    /// Bottom edge (exclusive)
    #[inline]
    pub fn bottom(&self) -> Scalar {
        self.position.y + Scalar::from_i32(self.height)
    }

    /// Centre point
    pub fn center(&self) -> Vector2 {
        let two = Scalar::from_i32(2);
        Vector2::new(
            self.position.x + Scalar::from_i32(self.width) / two,
            self.position.y + Scalar::from_i32(self.height) / two,
        )
    }

    /// Half-open overlap test
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Whether the point lies inside (half-open)
    pub fn contains_point(&self, p: Vector2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}

/// Circle described by its centre and radius
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    /// Centre x
    pub x: Scalar,
    /// Centre y
    pub y: Scalar,
    /// Radius
    pub radius: Scalar,
}

impl Circle {
    /// Create a circle
    pub fn new(x: Scalar, y: Scalar, radius: Scalar) -> Self {
        Circle { x, y, radius }
    }

    /// Centre point
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

/// Line segment between two points
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Segment {
    /// Start point
    pub start: Vector2,
    /// End point
    pub end: Vector2,
}

impl Segment {
    /// Create a segment
    pub fn new(start: Vector2, end: Vector2) -> Self {
        Segment { start, end }
    }
}

/// Circle-circle overlap, boundary inclusive
pub fn circles_intersect(a: &Circle, b: &Circle) -> bool {
    (a.center() - b.center()).length_at_most(a.radius + b.radius)
}

/// Closest point on (or in) the rectangle to `p`
pub fn closest_point_on_rect(p: Vector2, r: &Rect) -> Vector2 {
    Vector2::new(
        Real::clamp(p.x, r.left(), r.right()),
        Real::clamp(p.y, r.top(), r.bottom()),
    )
}

/// Circle-rectangle overlap, boundary inclusive
pub fn circle_intersects_rect(c: &Circle, r: &Rect) -> bool {
    let closest = closest_point_on_rect(c.center(), r);
    (c.center() - closest).length_at_most(c.radius)
}

/// Clip the parametric segment `origin + t * delta`, `t in [0, 1]`, against
/// the slab `[min, max]` on one axis. Returns `false` once the interval empties.
fn clip_axis(
    origin: Scalar,
    delta: Scalar,
    min: Scalar,
    max: Scalar,
    t_min: &mut Scalar,
    t_max: &mut Scalar,
) -> bool {
    if delta == Scalar::ZERO {
        return origin >= min && origin <= max;
    }
    let mut t1 = (min - origin) / delta;
    let mut t2 = (max - origin) / delta;
    if t1 > t2 {
        std::mem::swap(&mut t1, &mut t2);
    }
    if t1 > *t_min {
        *t_min = t1;
    }
    if t2 < *t_max {
        *t_max = t2;
    }
    *t_min <= *t_max
}

/// Slab test of a segment against an arbitrary box. Returns the entry time.
fn segment_entry_time(s: &Segment, min: Vector2, max: Vector2) -> Option<Scalar> {
    let delta = s.end - s.start;
    let mut t_min = Scalar::ZERO;
    let mut t_max = Scalar::ONE;

    if !clip_axis(s.start.x, delta.x, min.x, max.x, &mut t_min, &mut t_max) {
        return None;
    }
    if !clip_axis(s.start.y, delta.y, min.y, max.y, &mut t_min, &mut t_max) {
        return None;
    }
    if t_max < Scalar::ZERO || t_min > Scalar::ONE {
        return None;
    }
    Some(t_min)
}

/// Segment-rectangle intersection (slab test)
pub fn segment_intersects_rect(s: &Segment, r: &Rect) -> bool {
    let min = r.position;
    let max = Vector2::new(r.right(), r.bottom());
    segment_entry_time(s, min, max).is_some()
}

/// Sweep a circle from `start` to `end` against a rectangle
///
/// Returns the normalized time of impact in `[0, 1]`, or `None` when the path
/// misses. The rectangle is expanded by the radius on every side and the
/// centre path is slab-tested against it, which over-reports hits near the
/// rounded corners. Best effort only: the simulation itself is discrete.
pub fn sweep_circle_vs_rect(start: &Circle, end: &Circle, rect: &Rect) -> Option<Scalar> {
    let r = Vector2::new(start.radius, start.radius);
    let min = rect.position - r;
    let max = Vector2::new(rect.right(), rect.bottom()) + r;
    let path = Segment::new(start.center(), end.center());
    segment_entry_time(&path, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::scalar;

    fn rect(x: f32, y: f32, w: i32, h: i32) -> Rect {
        Rect::new(Vector2::from_f32(x, y), w, h)
    }

    #[test]
    fn test_layers_interact_either_direction() {
        assert!(layers_interact(0b01, 0b00, 0b10, 0b01));
        assert!(layers_interact(0b01, 0b10, 0b10, 0b00));
        assert!(!layers_interact(0b01, 0b01, 0b10, 0b10));
        assert!(!layers_interact(layers::ALL, layers::NONE, layers::ALL, layers::NONE));
    }

    #[test]
    fn test_rect_intersects_half_open() {
        let a = rect(0.0, 0.0, 10, 10);
        assert!(a.intersects(&rect(5.0, 5.0, 10, 10)));
        assert!(!a.intersects(&rect(10.0, 0.0, 10, 10)));
        assert!(!a.intersects(&rect(0.0, 10.0, 10, 10)));
        assert!(a.intersects(&rect(9.5, 9.5, 10, 10)));
        assert!(!a.intersects(&rect(-20.0, 0.0, 10, 10)));
    }

    #[test]
    fn test_rect_center_and_contains() {
        let a = rect(2.0, 4.0, 10, 6);
        assert_eq!(a.center(), Vector2::from_f32(7.0, 7.0));
        assert!(a.contains_point(Vector2::from_f32(2.0, 4.0)));
        assert!(!a.contains_point(Vector2::from_f32(12.0, 4.0)));
    }

    #[test]
    fn test_circle_boundary_is_closed() {
        let a = Circle::new(scalar(0.0), scalar(0.0), scalar(5.0));
        let touching = Circle::new(scalar(8.0), scalar(0.0), scalar(3.0));
        let apart = Circle::new(scalar(8.5), scalar(0.0), scalar(3.0));
        assert!(circles_intersect(&a, &touching));
        assert!(!circles_intersect(&a, &apart));
    }

    #[test]
    fn test_circle_vs_rect() {
        let r = rect(10.0, 10.0, 10, 10);
        assert!(circle_intersects_rect(
            &Circle::new(scalar(15.0), scalar(15.0), scalar(1.0)),
            &r
        ));
        assert!(circle_intersects_rect(
            &Circle::new(scalar(5.0), scalar(15.0), scalar(5.0)),
            &r
        ));
        assert!(!circle_intersects_rect(
            &Circle::new(scalar(5.0), scalar(5.0), scalar(5.0)),
            &r
        ));
    }

    #[test]
    fn test_far_circles_never_intersect() {
        let ball = Circle::new(scalar(13.0), scalar(103.0), scalar(3.0));
        let other = Circle::new(scalar(233.0), scalar(103.0), scalar(10.0));
        let corner = Circle::new(scalar(230.0), scalar(230.0), scalar(3.0));
        assert!(!circles_intersect(&ball, &other));
        assert!(!circles_intersect(&ball, &corner));

        let wall = rect(230.0, 0.0, 10, 240);
        assert!(!circle_intersects_rect(&ball, &wall));
        assert!(!circle_intersects_rect(&corner, &rect(0.0, 0.0, 10, 10)));
        assert!(circle_intersects_rect(
            &Circle::new(scalar(227.0), scalar(200.0), scalar(3.0)),
            &wall
        ));
    }

    #[test]
    fn test_segment_vs_rect() {
        let r = rect(10.0, 10.0, 10, 10);
        let through = Segment::new(Vector2::from_f32(0.0, 15.0), Vector2::from_f32(30.0, 15.0));
        let above = Segment::new(Vector2::from_f32(0.0, 5.0), Vector2::from_f32(30.0, 5.0));
        let vertical = Segment::new(Vector2::from_f32(15.0, 0.0), Vector2::from_f32(15.0, 30.0));
        let short = Segment::new(Vector2::from_f32(0.0, 15.0), Vector2::from_f32(5.0, 15.0));
        assert!(segment_intersects_rect(&through, &r));
        assert!(!segment_intersects_rect(&above, &r));
        assert!(segment_intersects_rect(&vertical, &r));
        assert!(!segment_intersects_rect(&short, &r));
    }

    #[test]
    fn test_sweep_reports_entry_time() {
        let r = rect(50.0, 0.0, 10, 10);
        let start = Circle::new(scalar(0.0), scalar(5.0), scalar(5.0));
        let end = Circle::new(scalar(100.0), scalar(5.0), scalar(5.0));
        let t = sweep_circle_vs_rect(&start, &end, &r).expect("path crosses the box");
        assert!((t.to_f32() - 0.45).abs() < 0.01);

        let miss = Circle::new(scalar(100.0), scalar(50.0), scalar(5.0));
        let start_high = Circle::new(scalar(0.0), scalar(50.0), scalar(5.0));
        assert!(sweep_circle_vs_rect(&start_high, &miss, &r).is_none());
    }
}
