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
//! Engine configuration
//!
//! Two layers:
//!
//! - **Compile-time capacities** (`const`s below). They size every
//!   fixed-capacity buffer in the hot path and therefore bound worst-case
//!   RAM and iteration counts on microcontrollers. Exceeding them degrades
//!   gracefully (work is dropped and counted), it never reallocates.
//! - **Runtime tuning** ([`PhysicsConfig`]): gravity, iteration counts and
//!   world size. Validated once when a [`CollisionSystem`] is built.
//!
//! [`CollisionSystem`]: crate::collision::CollisionSystem

use crate::error::ConfigError;
use crate::math::{Real, Scalar};

/// Logical world width covered by the spatial grid
pub const LOGICAL_WIDTH: i32 = 240;

/// Logical world height covered by the spatial grid
pub const LOGICAL_HEIGHT: i32 = 240;

/// Side of one spatial grid cell in world units
pub const SPATIAL_GRID_CELL_SIZE: i32 = 32;

/// Actors stored per grid cell before insertions are dropped
pub const SPATIAL_GRID_MAX_ENTITIES_PER_CELL: usize = 24;

/// Grid columns (the `+ 1` covers the partial cell at the far edge)
pub const SPATIAL_GRID_COLS: usize = (LOGICAL_WIDTH / SPATIAL_GRID_CELL_SIZE + 1) as usize;

/// Grid rows
pub const SPATIAL_GRID_ROWS: usize = (LOGICAL_HEIGHT / SPATIAL_GRID_CELL_SIZE + 1) as usize;

/// Total grid cells
pub const SPATIAL_GRID_MAX_CELLS: usize = SPATIAL_GRID_COLS * SPATIAL_GRID_ROWS;

/// Contact pairs kept per frame, per list (dynamic and static)
pub const PHYSICS_MAX_PAIRS: usize = 128;

/// Default number of relaxation passes per frame
pub const PHYSICS_RELAXATION_ITERATIONS: u32 = 3;

/// Candidates returned by one broad-phase query
pub const MAX_POTENTIAL_COLLIDERS: usize = 64;

/// Overlaps collected by one kinematic collision check
pub const KINEMATIC_MAX_COLLISIONS: usize = 16;

/// Default sub-steps per `move_and_collide`
pub const KINEMATIC_SUBSTEPS: u32 = 4;

/// Upper bound on sub-steps per `move_and_collide`
pub const MAX_KINEMATIC_SUBSTEPS: u32 = 64;

/// Default actor slots reserved up front by a collision system
pub const DEFAULT_ACTOR_CAPACITY: usize = 64;

/// Default slide iterations per `move_and_slide`
pub const KINEMATIC_MAX_SLIDES: u32 = 4;

/// Default downward gravity in world units per second squared
pub const DEFAULT_GRAVITY: f32 = 200.0;

/// Runtime physics tuning
///
/// # Examples
///
/// ```
/// use microphys::config::PhysicsConfig;
///
/// let config = PhysicsConfig::default()
///     .with_gravity(400.0)
///     .with_relaxation_iterations(5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsConfig {
    /// Downward gravity applied to rigid bodies (units/s²)
    pub gravity: f32,
    /// Relaxation passes over the recorded contact pairs each frame
    pub relaxation_iterations: u32,
    /// Sub-steps used by kinematic `move_and_collide`
    pub kinematic_substeps: u32,
    /// Maximum slide iterations in kinematic `move_and_slide`
    pub max_slides: u32,
    /// Minimum `normal · up` for a contact to count as floor
    pub floor_threshold: f32,
    /// World width used as the fallback right limit for bounded bodies
    pub world_width: i32,
    /// World height used as the fallback bottom limit for bounded bodies
    pub world_height: i32,
    /// Actor slots reserved when the system is built
    pub actor_capacity: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: DEFAULT_GRAVITY,
            relaxation_iterations: PHYSICS_RELAXATION_ITERATIONS,
            kinematic_substeps: KINEMATIC_SUBSTEPS,
            max_slides: KINEMATIC_MAX_SLIDES,
            floor_threshold: 0.7,
            world_width: LOGICAL_WIDTH,
            world_height: LOGICAL_HEIGHT,
            actor_capacity: DEFAULT_ACTOR_CAPACITY,
        }
    }
}

impl PhysicsConfig {
    /// Set gravity
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the number of relaxation passes
    pub fn with_relaxation_iterations(mut self, iterations: u32) -> Self {
        self.relaxation_iterations = iterations;
        self
    }

    /// Set kinematic sub-steps
    pub fn with_kinematic_substeps(mut self, substeps: u32) -> Self {
        self.kinematic_substeps = substeps;
        self
    }

    /// Set kinematic slide iterations
    pub fn with_max_slides(mut self, slides: u32) -> Self {
        self.max_slides = slides;
        self
    }

    /// Set the floor classification threshold
    pub fn with_floor_threshold(mut self, threshold: f32) -> Self {
        self.floor_threshold = threshold;
        self
    }

    /// Set the world size
    pub fn with_world_size(mut self, width: i32, height: i32) -> Self {
        self.world_width = width;
        self.world_height = height;
        self
    }

    /// Set how many actor slots to reserve up front
    pub fn with_actor_capacity(mut self, capacity: usize) -> Self {
        self.actor_capacity = capacity;
        self
    }

    /// Gravity as a [`Scalar`]
    pub fn gravity_scalar(&self) -> Scalar {
        Scalar::from_f32(self.gravity)
    }

    /// Floor threshold as a [`Scalar`]
    pub fn floor_threshold_scalar(&self) -> Scalar {
        Scalar::from_f32(self.floor_threshold)
    }

    /// Check every field
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relaxation_iterations == 0 {
            return Err(ConfigError::ZeroRelaxationIterations);
        }
        if self.kinematic_substeps == 0 {
            return Err(ConfigError::ZeroKinematicSubsteps);
        }
        if self.kinematic_substeps > MAX_KINEMATIC_SUBSTEPS {
            return Err(ConfigError::TooManyKinematicSubsteps(self.kinematic_substeps));
        }
        if self.max_slides == 0 {
            return Err(ConfigError::ZeroMaxSlides);
        }
        // Gravity is multiplied by mass and gravity scale; keep headroom
        // below the 16.16 integer range.
        if !self.gravity.is_finite() || self.gravity.abs() > 16384.0 {
            return Err(ConfigError::GravityOutOfRange(self.gravity));
        }
        if !(self.floor_threshold > 0.0 && self.floor_threshold <= 1.0) {
            return Err(ConfigError::FloorThresholdOutOfRange(self.floor_threshold));
        }
        if self.world_width <= 0 || self.world_height <= 0 {
            return Err(ConfigError::InvalidWorldSize {
                width: self.world_width,
                height: self.world_height,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.relaxation_iterations, 3);
        assert_eq!(config.kinematic_substeps, 4);
    }

    #[test]
    fn test_grid_dimensions() {
        assert_eq!(SPATIAL_GRID_COLS, 8);
        assert_eq!(SPATIAL_GRID_ROWS, 8);
        assert_eq!(SPATIAL_GRID_MAX_CELLS, 64);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero_iters = PhysicsConfig::default().with_relaxation_iterations(0);
        assert_eq!(
            zero_iters.validate(),
            Err(ConfigError::ZeroRelaxationIterations)
        );

        let zero_steps = PhysicsConfig::default().with_kinematic_substeps(0);
        assert_eq!(zero_steps.validate(), Err(ConfigError::ZeroKinematicSubsteps));

        let many_steps = PhysicsConfig::default().with_kinematic_substeps(u32::MAX);
        assert_eq!(
            many_steps.validate(),
            Err(ConfigError::TooManyKinematicSubsteps(u32::MAX))
        );
        let max_steps = PhysicsConfig::default().with_kinematic_substeps(MAX_KINEMATIC_SUBSTEPS);
        assert!(max_steps.validate().is_ok());

        let huge_gravity = PhysicsConfig::default().with_gravity(1.0e6);
        assert!(matches!(
            huge_gravity.validate(),
            Err(ConfigError::GravityOutOfRange(_))
        ));

        let threshold = PhysicsConfig::default().with_floor_threshold(0.0);
        assert!(matches!(
            threshold.validate(),
            Err(ConfigError::FloorThresholdOutOfRange(_))
        ));

        let world = PhysicsConfig::default().with_world_size(0, 10);
        assert!(matches!(
            world.validate(),
            Err(ConfigError::InvalidWorldSize { .. })
        ));
    }
}
