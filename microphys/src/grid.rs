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
//! Uniform-grid broad phase
//!
//! The world is split into `SPATIAL_GRID_COLS x SPATIAL_GRID_ROWS` square
//! cells. Every frame the grid is cleared and each moving actor is appended
//! to the bucket of every cell its hit box touches. A query then only has to
//! look at the buckets its own hit box touches.
//!
//! All storage is inline: buckets are fixed-capacity `heapless::Vec`s, so
//! building and querying the grid never allocates. A full bucket drops
//! further insertions and the caller is told how many were lost.
//!
//! # De-duplication
//!
//! An actor spanning several cells appears in several buckets. Rather than a
//! hash set, each query carries a [`QueryToken`] that is stamped on every
//! actor as it is collected; an actor already carrying the current token is
//! skipped.

use heapless::Vec as FixedVec;

use crate::arena::{ActorArena, ActorHandle};
use crate::body::Actor;
use crate::config::{
    SPATIAL_GRID_CELL_SIZE, SPATIAL_GRID_COLS, SPATIAL_GRID_MAX_CELLS,
    SPATIAL_GRID_MAX_ENTITIES_PER_CELL, SPATIAL_GRID_ROWS,
};
use crate::math::{Real, Scalar};

type Bucket = FixedVec<ActorHandle, SPATIAL_GRID_MAX_ENTITIES_PER_CELL>;

/// Per-query de-duplication stamp
///
/// Owned by whoever issues queries (normally the collision system) and
/// advanced once per query. Zero is reserved for "never stamped".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryToken(u32);

impl QueryToken {
    /// First token in the sequence
    pub fn new() -> Self {
        QueryToken(1)
    }

    /// Raw stamp value
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Move to the next token, skipping zero on wrap-around
    pub fn advance(&mut self) -> QueryToken {
        self.0 = self.0.wrapping_add(1);
        if self.0 == 0 {
            self.0 = 1;
        }
        *self
    }
}

impl Default for QueryToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Inclusive cell range covered by a hit box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min_col: usize,
    max_col: usize,
    min_row: usize,
    max_row: usize,
}

fn cell_of(coord: Scalar, limit: usize) -> usize {
    let cell = Real::to_i32(coord).div_euclid(SPATIAL_GRID_CELL_SIZE);
    cell.clamp(0, limit as i32 - 1) as usize
}

fn cell_range(actor: &Actor) -> CellRange {
    let hit = actor.hit_box();
    let (left, top) = (hit.left(), hit.top());
    // The far edge is exclusive
    let right = hit.right() - <Scalar as Real>::EPSILON;
    let bottom = hit.bottom() - <Scalar as Real>::EPSILON;

    CellRange {
        min_col: cell_of(left, SPATIAL_GRID_COLS),
        max_col: cell_of(Real::max(right, left), SPATIAL_GRID_COLS),
        min_row: cell_of(top, SPATIAL_GRID_ROWS),
        max_row: cell_of(Real::max(bottom, top), SPATIAL_GRID_ROWS),
    }
}

/// Fixed-size spatial hash over the logical world
pub struct SpatialGrid {
    cells: [Bucket; SPATIAL_GRID_MAX_CELLS],
}

impl SpatialGrid {
    /// Create an empty grid
    pub fn new() -> Self {
        SpatialGrid {
            cells: core::array::from_fn(|_| FixedVec::new()),
        }
    }

    /// Empty every bucket
    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.clear();
        }
    }

    /// Add `handle` to every cell its actor's hit box touches
    ///
    /// Returns how many cells were already full and dropped the insertion.
    pub fn insert(&mut self, handle: ActorHandle, actor: &Actor) -> usize {
        let range = cell_range(actor);
        let mut dropped = 0;

        for row in range.min_row..=range.max_row {
            for col in range.min_col..=range.max_col {
                let cell = &mut self.cells[row * SPATIAL_GRID_COLS + col];
                if cell.push(handle).is_err() {
                    dropped += 1;
                }
            }
        }

        dropped
    }

    /// Collect every actor sharing a cell with `handle`
    ///
    /// Each candidate is reported once, `handle` itself is never reported,
    /// and disabled actors are still listed (filtering happens in the narrow
    /// phase). Collection stops once `out` is full; the return value is
    /// `true` if candidates were left out.
    pub fn potential_colliders<const N: usize>(
        &self,
        arena: &mut ActorArena,
        handle: ActorHandle,
        token: QueryToken,
        out: &mut FixedVec<ActorHandle, N>,
    ) -> bool {
        out.clear();

        let Some(actor) = arena.get(handle) else {
            return false;
        };
        let range = cell_range(actor);

        for row in range.min_row..=range.max_row {
            for col in range.min_col..=range.max_col {
                for &other in self.cells[row * SPATIAL_GRID_COLS + col].iter() {
                    if other == handle {
                        continue;
                    }
                    let Some(candidate) = arena.get_mut(other) else {
                        continue;
                    };
                    if candidate.query_stamp == token.value() {
                        continue;
                    }
                    if out.push(other).is_err() {
                        return true;
                    }
                    candidate.query_stamp = token.value();
                }
            }
        }

        false
    }

    /// Number of handles stored in the cell at (`col`, `row`)
    pub fn cell_len(&self, col: usize, row: usize) -> usize {
        if col >= SPATIAL_GRID_COLS || row >= SPATIAL_GRID_ROWS {
            return 0;
        }
        self.cells[row * SPATIAL_GRID_COLS + col].len()
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new()
    }
}
