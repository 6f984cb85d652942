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
//! 2D vector over [`Scalar`]

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use super::{Real, Scalar, SQUARE_SAFE_LIMIT};

/// 2D vector
///
/// Plain value type. The algebra mirrors what the collision response needs:
/// [`reflect`](Vector2::reflect) for bouncing bodies and
/// [`slide`](Vector2::slide) for bodies that should stop against a surface.
///
/// # Examples
///
/// ```
/// use microphys::math::{scalar, Vector2};
///
/// let v = Vector2::from_f32(3.0, -4.0);
/// let up = Vector2::from_f32(0.0, -1.0);
/// assert_eq!(v.slide(up), Vector2::from_f32(3.0, 0.0));
/// assert_eq!(v.reflect(up), Vector2::from_f32(3.0, 4.0));
/// assert_eq!(v.length(), scalar(5.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    /// Horizontal component
    pub x: Scalar,
    /// Vertical component (grows downwards in screen space)
    pub y: Scalar,
}

impl Vector2 {
    /// The zero vector
    pub const ZERO: Vector2 = Vector2 {
        x: <Scalar as Real>::ZERO,
        y: <Scalar as Real>::ZERO,
    };

    /// Create a vector from scalar components
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Vector2 { x, y }
    }

    /// Create a vector from float components
    pub fn from_f32(x: f32, y: f32) -> Self {
        Vector2::new(Scalar::from_f32(x), Scalar::from_f32(y))
    }

    /// Create a vector from integer components
    pub fn from_i32(x: i32, y: i32) -> Self {
        Vector2::new(Scalar::from_i32(x), Scalar::from_i32(y))
    }

    /// Squared length, no square root involved
    #[inline]
    pub fn length_squared(self) -> Scalar {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean length
    ///
    /// Long vectors are scaled by their largest component before squaring,
    /// so the result is valid for any offset inside the world.
    pub fn length(self) -> Scalar {
        let ax = Real::abs(self.x);
        let ay = Real::abs(self.y);
        let m = Real::max(ax, ay);
        if m <= Scalar::from_i32(SQUARE_SAFE_LIMIT) {
            return Real::sqrt(self.length_squared());
        }
        let sx = ax / m;
        let sy = ay / m;
        m * Real::sqrt(sx * sx + sy * sy)
    }

    /// Whether the length is at most `limit`, boundary inclusive
    ///
    /// A component beyond `limit` rejects before anything is squared.
    pub fn length_at_most(self, limit: Scalar) -> bool {
        if Real::abs(self.x) > limit || Real::abs(self.y) > limit {
            return false;
        }
        if limit <= Scalar::from_i32(SQUARE_SAFE_LIMIT) {
            self.length_squared() <= limit * limit
        } else {
            self.length() <= limit
        }
    }

    /// Normalize in place; the zero vector stays zero
    pub fn normalize(&mut self) {
        let len = self.length();
        if len > Scalar::ZERO {
            *self /= len;
        }
    }

    /// Unit-length copy; the zero vector stays zero
    pub fn normalized(self) -> Self {
        let mut v = self;
        v.normalize();
        v
    }

    /// Dot product
    #[inline]
    pub fn dot(self, other: Vector2) -> Scalar {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    #[inline]
    pub fn cross(self, other: Vector2) -> Scalar {
        self.x * other.y - self.y * other.x
    }

    /// Mirror across the surface with unit normal `n`
    ///
    /// `v - n * 2(v·n)`
    pub fn reflect(self, n: Vector2) -> Self {
        let two = Scalar::from_i32(2);
        self - n * (two * self.dot(n))
    }

    /// Remove the component along unit normal `n`
    ///
    /// `v - n * (v·n)`
    pub fn slide(self, n: Vector2) -> Self {
        self - n * self.dot(n)
    }

    /// Projection onto `onto`; zero when `onto` is zero
    pub fn project(self, onto: Vector2) -> Self {
        let denom = onto.length_squared();
        if Real::is_zero_approx(denom) {
            return Vector2::ZERO;
        }
        onto * (self.dot(onto) / denom)
    }

    /// Linear interpolation towards `to`
    pub fn lerp(self, to: Vector2, t: Scalar) -> Self {
        Vector2::new(Real::lerp(self.x, to.x, t), Real::lerp(self.y, to.y, t))
    }

    /// Step at most `delta` towards `target`
    ///
    /// Snaps exactly onto `target` once it is within `delta` (or closer than
    /// epsilon) so repeated calls never overshoot and oscillate.
    pub fn move_toward(self, target: Vector2, delta: Scalar) -> Self {
        let to_target = target - self;
        let len = to_target.length();
        if len <= delta || len < <Scalar as Real>::EPSILON {
            return target;
        }
        self + to_target / len * delta
    }

    /// Clamp the magnitude to `limit` without changing direction
    pub fn limit_length(self, limit: Scalar) -> Self {
        if self.length_at_most(limit) {
            return self;
        }
        let len = self.length();
        if len > Scalar::ZERO {
            return self * (limit / len);
        }
        self
    }

    /// Distance to another point
    pub fn distance_to(self, other: Vector2) -> Scalar {
        (other - self).length()
    }

    /// Squared distance to another point
    pub fn distance_squared_to(self, other: Vector2) -> Scalar {
        (other - self).length_squared()
    }

    /// Both components within epsilon of zero
    pub fn is_zero_approx(self) -> bool {
        Real::is_zero_approx(self.x) && Real::is_zero_approx(self.y)
    }

    /// Component-wise approximate equality
    pub fn is_equal_approx(self, other: Vector2) -> bool {
        Real::is_equal_approx(self.x, other.x) && Real::is_equal_approx(self.y, other.y)
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    #[inline]
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    #[inline]
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Scalar> for Vector2 {
    type Output = Vector2;

    #[inline]
    fn mul(self, rhs: Scalar) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<Scalar> for Vector2 {
    type Output = Vector2;

    #[inline]
    fn div(self, rhs: Scalar) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    #[inline]
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<Scalar> for Vector2 {
    #[inline]
    fn mul_assign(&mut self, rhs: Scalar) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl DivAssign<Scalar> for Vector2 {
    #[inline]
    fn div_assign(&mut self, rhs: Scalar) {
        self.x /= rhs;
        self.y /= rhs;
    }
}
