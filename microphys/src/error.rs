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
//! Error types
//!
//! The per-frame pipeline never fails: capacity exhaustion, degenerate
//! numbers and missing collaborators are absorbed where they happen. The only
//! fallible surface is configuration, checked once when a system is built.

use std::fmt;

use crate::config::MAX_KINEMATIC_SUBSTEPS;

/// Rejected [`PhysicsConfig`](crate::config::PhysicsConfig) value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Relaxation needs at least one pass
    ZeroRelaxationIterations,
    /// Kinematic movement needs at least one sub-step
    ZeroKinematicSubsteps,
    /// Kinematic sub-steps above the supported maximum
    TooManyKinematicSubsteps(u32),
    /// Slide resolution needs at least one iteration
    ZeroMaxSlides,
    /// Gravity is not finite or does not fit the fixed-point range
    GravityOutOfRange(f32),
    /// Floor threshold must lie in `(0, 1]`
    FloorThresholdOutOfRange(f32),
    /// World dimensions must be positive
    InvalidWorldSize {
        /// Requested width
        width: i32,
        /// Requested height
        height: i32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroRelaxationIterations => {
                write!(f, "relaxation iterations must be at least 1")
            }
            ConfigError::ZeroKinematicSubsteps => {
                write!(f, "kinematic sub-steps must be at least 1")
            }
            ConfigError::TooManyKinematicSubsteps(steps) => write!(
                f,
                "kinematic sub-steps {} exceed the maximum of {}",
                steps, MAX_KINEMATIC_SUBSTEPS
            ),
            ConfigError::ZeroMaxSlides => write!(f, "max slides must be at least 1"),
            ConfigError::GravityOutOfRange(g) => {
                write!(f, "gravity {} is not finite or exceeds the 16.16 range", g)
            }
            ConfigError::FloorThresholdOutOfRange(t) => {
                write!(f, "floor threshold {} must lie in (0, 1]", t)
            }
            ConfigError::InvalidWorldSize { width, height } => {
                write!(f, "world size {}x{} must be positive", width, height)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ConfigError::InvalidWorldSize {
            width: 0,
            height: 240,
        };
        assert_eq!(err.to_string(), "world size 0x240 must be positive");
        assert!(ConfigError::GravityOutOfRange(f32::NAN)
            .to_string()
            .contains("16.16"));
        assert_eq!(
            ConfigError::TooManyKinematicSubsteps(1000).to_string(),
            "kinematic sub-steps 1000 exceed the maximum of 64"
        );
    }
}
