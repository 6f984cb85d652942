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
//! Numeric core shared by every physics quantity
//!
//! All positions, velocities, radii and times are expressed in a single
//! [`Scalar`] type chosen at compile time:
//!
//! - **`f32`** (default): native floating point for targets with an FPU
//!   (desktop, ESP32, ESP32-S3).
//! - **[`Fixed16`]** (`fixed-point` feature): 16.16 fixed point for
//!   FPU-less cores (ESP32-C3/C2/C6). Deterministic across platforms.
//!
//! # Range and precision
//!
//! With `fixed-point` enabled every quantity must stay within roughly
//! ±32768 with a resolution of 1/65536. Gravity, speeds and world sizes
//! are tuned with that in mind: a product such as `velocity * velocity`
//! of two values above ~181 already overflows the integer part.
//!
//! Distances never square raw world-sized offsets. [`Vector2::length`]
//! rescales vectors with a component above [`SQUARE_SAFE_LIMIT`] into the
//! unit box before squaring, and [`Vector2::length_at_most`] rejects on a
//! single axis first, so every overlap test stays in range anywhere in a
//! 240x240 world. [`Vector2::length_squared`] and [`Vector2::dot`] are raw
//! products and carry the plain 16.16 limits.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

mod fixed;
mod vector2;

pub use fixed::Fixed16;
pub use vector2::Vector2;

/// Scalar type used by the whole crate
#[cfg(feature = "fixed-point")]
pub type Scalar = Fixed16;

/// Scalar type used by the whole crate
#[cfg(not(feature = "fixed-point"))]
pub type Scalar = f32;

/// True when [`Scalar`] is [`Fixed16`]
pub const USE_FIXED_POINT: bool = cfg!(feature = "fixed-point");

/// Largest component magnitude whose squares still sum inside the 16.16
/// range (`2 * 127² < 32768`)
pub const SQUARE_SAFE_LIMIT: i32 = 127;

/// Operations every scalar backend provides
///
/// Implemented for `f32` and [`Fixed16`]. Physics code only ever talks to
/// [`Scalar`] through this trait and the arithmetic operators, so switching
/// backends never changes call sites.
pub trait Real:
    Copy
    + Debug
    + Default
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + 'static
{
    /// Additive identity
    const ZERO: Self;
    /// Multiplicative identity
    const ONE: Self;
    /// Tolerance used by the `*_approx` helpers
    const EPSILON: Self;

    /// Convert from an integer
    fn from_i32(v: i32) -> Self;

    /// Convert from a float, rounding to the nearest representable value
    fn from_f32(v: f32) -> Self;

    /// Convert to a float
    fn to_f32(self) -> f32;

    /// Convert to an integer, discarding the fractional part
    fn to_i32(self) -> i32;

    /// Square root; non-positive inputs yield zero
    fn sqrt(self) -> Self;

    /// Absolute value
    fn abs(self) -> Self {
        if self < Self::ZERO {
            -self
        } else {
            self
        }
    }

    /// Smaller of two values
    fn min(self, other: Self) -> Self {
        if self < other {
            self
        } else {
            other
        }
    }

    /// Larger of two values
    fn max(self, other: Self) -> Self {
        if self > other {
            self
        } else {
            other
        }
    }

    /// Clamp into `[lo, hi]`
    fn clamp(self, lo: Self, hi: Self) -> Self {
        if self < lo {
            lo
        } else if self > hi {
            hi
        } else {
            self
        }
    }

    /// -1, 0 or 1
    fn signum(self) -> Self {
        if self < Self::ZERO {
            -Self::ONE
        } else if self > Self::ZERO {
            Self::ONE
        } else {
            Self::ZERO
        }
    }

    /// Linear interpolation between `self` and `to`
    fn lerp(self, to: Self, t: Self) -> Self {
        self + (to - self) * t
    }

    /// Check whether the value is within [`Real::EPSILON`] of zero
    fn is_zero_approx(self) -> bool {
        Real::abs(self) < Self::EPSILON
    }

    /// Check whether two values are within [`Real::EPSILON`] of each other
    fn is_equal_approx(self, other: Self) -> bool {
        Real::abs(self - other) < Self::EPSILON
    }
}

impl Real for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const EPSILON: Self = 0.00001;

    #[inline]
    fn from_i32(v: i32) -> Self {
        v as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn sqrt(self) -> Self {
        if self <= 0.0 {
            0.0
        } else {
            f32::sqrt(self)
        }
    }
}

/// Shorthand for [`Real::from_f32`] on the active [`Scalar`]
#[inline]
pub fn scalar(v: f32) -> Scalar {
    <Scalar as Real>::from_f32(v)
}

/// Convert a frame delta in integer milliseconds to seconds
#[inline]
pub fn millis_to_seconds(delta_ms: u32) -> Scalar {
    let ms = delta_ms.min(i32::MAX as u32) as i32;
    <Scalar as Real>::from_i32(ms) / <Scalar as Real>::from_i32(1000)
}
