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
//! 16.16 fixed-point numbers
//!
//! ```text
//! [S][IIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]
//!     15 bits + sign      16 bits
//!
//! Range:      -32768.0 ..= 32767.99998
//! Resolution: 1 / 65536
//! ```
//!
//! Addition and subtraction wrap on overflow so the result is identical on
//! every target. Multiplication widens to 64 bits before shifting back.
//! Division by zero returns zero rather than trapping.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use super::Real;

/// Signed 16.16 fixed-point number
///
/// # Examples
///
/// ```
/// use microphys::math::{Fixed16, Real};
///
/// let a = Fixed16::from_f32(1.5);
/// let b = Fixed16::from_i32(2);
/// assert_eq!((a * b).to_f32(), 3.0);
/// assert_eq!(a / Fixed16::ZERO, Fixed16::ZERO);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fixed16(i32);

impl Fixed16 {
    /// Number of fractional bits
    pub const FRACTIONAL_BITS: u32 = 16;
    /// Raw representation of 1.0
    pub const RAW_ONE: i32 = 1 << Self::FRACTIONAL_BITS;
    /// Largest representable value
    pub const MAX: Fixed16 = Fixed16(i32::MAX);
    /// Smallest representable value
    pub const MIN: Fixed16 = Fixed16(i32::MIN);

    /// Build from the raw 16.16 integer
    pub const fn from_raw(raw: i32) -> Self {
        Fixed16(raw)
    }

    /// Raw 16.16 integer
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Convert from a double, rounding to nearest
    pub fn from_f64(v: f64) -> Self {
        let bias = if v >= 0.0 { 0.5 } else { -0.5 };
        Fixed16((v * Self::RAW_ONE as f64 + bias) as i32)
    }

    /// Convert to a double
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::RAW_ONE as f64
    }

    /// Digit-by-digit square root on the 64-bit shifted value
    ///
    /// `sqrt(raw * 2^16)` is exactly the raw form of the 16.16 result, so the
    /// whole computation stays in integers.
    fn isqrt(self) -> Self {
        if self.0 <= 0 {
            return Fixed16(0);
        }

        let mut val = (self.0 as u64) << Self::FRACTIONAL_BITS;
        let mut res: u64 = 0;
        let mut bit: u64 = 1 << 62;

        while bit > val {
            bit >>= 2;
        }

        while bit != 0 {
            if val >= res + bit {
                val -= res + bit;
                res = (res >> 1) + bit;
            } else {
                res >>= 1;
            }
            bit >>= 2;
        }

        Fixed16(res as i32)
    }
}

impl Real for Fixed16 {
    const ZERO: Self = Fixed16(0);
    const ONE: Self = Fixed16(Self::RAW_ONE);
    // 0.00001 rounds below one ulp, so the smallest step stands in
    const EPSILON: Self = Fixed16(1);

    #[inline]
    fn from_i32(v: i32) -> Self {
        Fixed16(v.wrapping_shl(Self::FRACTIONAL_BITS))
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        let bias = if v >= 0.0 { 0.5 } else { -0.5 };
        Fixed16((v * Self::RAW_ONE as f32 + bias) as i32)
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self.0 as f32 / Self::RAW_ONE as f32
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self.0 >> Self::FRACTIONAL_BITS
    }

    #[inline]
    fn sqrt(self) -> Self {
        self.isqrt()
    }
}

impl Add for Fixed16 {
    type Output = Fixed16;

    #[inline]
    fn add(self, rhs: Fixed16) -> Fixed16 {
        Fixed16(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed16 {
    type Output = Fixed16;

    #[inline]
    fn sub(self, rhs: Fixed16) -> Fixed16 {
        Fixed16(self.0.wrapping_sub(rhs.0))
    }
}

impl Mul for Fixed16 {
    type Output = Fixed16;

    #[inline]
    fn mul(self, rhs: Fixed16) -> Fixed16 {
        let wide = self.0 as i64 * rhs.0 as i64;
        Fixed16((wide >> Self::FRACTIONAL_BITS) as i32)
    }
}

impl Div for Fixed16 {
    type Output = Fixed16;

    #[inline]
    fn div(self, rhs: Fixed16) -> Fixed16 {
        if rhs.0 == 0 {
            return Fixed16(0);
        }
        let wide = (self.0 as i64) << Self::FRACTIONAL_BITS;
        Fixed16((wide / rhs.0 as i64) as i32)
    }
}

impl Neg for Fixed16 {
    type Output = Fixed16;

    #[inline]
    fn neg(self) -> Fixed16 {
        Fixed16(self.0.wrapping_neg())
    }
}

impl AddAssign for Fixed16 {
    #[inline]
    fn add_assign(&mut self, rhs: Fixed16) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed16 {
    #[inline]
    fn sub_assign(&mut self, rhs: Fixed16) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fixed16 {
    #[inline]
    fn mul_assign(&mut self, rhs: Fixed16) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fixed16 {
    #[inline]
    fn div_assign(&mut self, rhs: Fixed16) {
        *self = *self / rhs;
    }
}

impl From<i32> for Fixed16 {
    fn from(v: i32) -> Self {
        <Fixed16 as Real>::from_i32(v)
    }
}

impl From<f32> for Fixed16 {
    fn from(v: f32) -> Self {
        <Fixed16 as Real>::from_f32(v)
    }
}

impl From<f64> for Fixed16 {
    fn from(v: f64) -> Self {
        Fixed16::from_f64(v)
    }
}

impl fmt::Display for Fixed16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}
