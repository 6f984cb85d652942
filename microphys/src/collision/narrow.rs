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
//! Narrow phase: exact overlap tests and contact generation
//!
//! Dispatch is on the pair of [`CollisionShape`]s. Every contact normal
//! points **from `b` towards `a`**, i.e. it is the direction `a` has to move
//! to separate.

use crate::body::{Actor, CollisionShape};
use crate::geometry::{circle_intersects_rect, circles_intersect, closest_point_on_rect, Circle, Rect};
use crate::math::{Real, Scalar, Vector2};

/// Separation data for an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal from `b` to `a`
    pub normal: Vector2,
    /// Overlap depth along `normal`
    pub penetration: Scalar,
}

impl Contact {
    fn flipped(self) -> Contact {
        Contact {
            normal: -self.normal,
            penetration: self.penetration,
        }
    }
}

/// Whether two actors overlap according to their declared shapes
pub fn overlaps(a: &Actor, b: &Actor) -> bool {
    match (a.circle(), b.circle()) {
        (Some(ca), Some(cb)) => circles_intersect(&ca, &cb),
        (Some(ca), None) => circle_intersects_rect(&ca, &b.hit_box()),
        (None, Some(cb)) => circle_intersects_rect(&cb, &a.hit_box()),
        (None, None) => a.hit_box().intersects(&b.hit_box()),
    }
}

/// Contact for an overlapping pair, `None` when separated
pub fn contact(a: &Actor, b: &Actor) -> Option<Contact> {
    match (a.shape(), b.shape()) {
        (CollisionShape::Circle, CollisionShape::Circle) => {
            circle_circle(&a.circle()?, &b.circle()?)
        }
        (CollisionShape::Circle, CollisionShape::Aabb) => {
            circle_rect(&a.circle()?, &b.hit_box())
        }
        (CollisionShape::Aabb, CollisionShape::Circle) => {
            circle_rect(&b.circle()?, &a.hit_box()).map(Contact::flipped)
        }
        (CollisionShape::Aabb, CollisionShape::Aabb) => aabb_aabb(&a.hit_box(), &b.hit_box()),
    }
}

/// Minimum-overlap-axis contact between two boxes
///
/// The normal is axis aligned; ties go to the vertical axis.
pub fn aabb_aabb(a: &Rect, b: &Rect) -> Option<Contact> {
    let two = Scalar::from_i32(2);
    let d = a.center() - b.center();
    let half_w = Scalar::from_i32(a.width + b.width) / two;
    let half_h = Scalar::from_i32(a.height + b.height) / two;

    let overlap_x = half_w - Real::abs(d.x);
    let overlap_y = half_h - Real::abs(d.y);
    if overlap_x <= Scalar::ZERO || overlap_y <= Scalar::ZERO {
        return None;
    }

    if overlap_x < overlap_y {
        let sign = if d.x > Scalar::ZERO { Scalar::ONE } else { -Scalar::ONE };
        Some(Contact {
            normal: Vector2::new(sign, Scalar::ZERO),
            penetration: overlap_x,
        })
    } else {
        let sign = if d.y > Scalar::ZERO { Scalar::ONE } else { -Scalar::ONE };
        Some(Contact {
            normal: Vector2::new(Scalar::ZERO, sign),
            penetration: overlap_y,
        })
    }
}

fn circle_circle(a: &Circle, b: &Circle) -> Option<Contact> {
    let d = a.center() - b.center();
    let radii = a.radius + b.radius;
    if !d.length_at_most(radii) {
        return None;
    }

    let dist = d.length();
    if dist > <Scalar as Real>::EPSILON {
        Some(Contact {
            normal: d / dist,
            penetration: radii - dist,
        })
    } else {
        // Concentric: push `a` straight up
        Some(Contact {
            normal: Vector2::new(Scalar::ZERO, -Scalar::ONE),
            penetration: radii,
        })
    }
}

/// Contact with the circle as `a`
fn circle_rect(c: &Circle, r: &Rect) -> Option<Contact> {
    let center = c.center();
    let closest = closest_point_on_rect(center, r);
    let d = center - closest;
    if !d.length_at_most(c.radius) {
        return None;
    }

    let dist = d.length();
    if dist > <Scalar as Real>::EPSILON {
        return Some(Contact {
            normal: d / dist,
            penetration: c.radius - dist,
        });
    }

    // Centre inside the box: leave through the nearest edge
    let zero = Scalar::ZERO;
    let one = Scalar::ONE;
    let edges = [
        (center.x - r.left(), Vector2::new(-one, zero)),
        (r.right() - center.x, Vector2::new(one, zero)),
        (center.y - r.top(), Vector2::new(zero, -one)),
        (r.bottom() - center.y, Vector2::new(zero, one)),
    ];
    let mut best = edges[0];
    for edge in &edges[1..] {
        if edge.0 < best.0 {
            best = *edge;
        }
    }

    Some(Contact {
        normal: best.1,
        penetration: c.radius + best.0,
    })
}
