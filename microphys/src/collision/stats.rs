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
//! Per-frame pipeline counters

/// Counters for the last collision frame
///
/// Every fixed-capacity buffer in the pipeline degrades by dropping work;
/// these counters make the drops visible. Reset at the start of each
/// [`update`](super::CollisionSystem::update).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Actors inserted into the grid
    pub grid_insertions: usize,
    /// Grid cell insertions lost to full buckets
    pub dropped_cell_insertions: usize,
    /// Broad-phase queries whose output buffer filled up
    pub truncated_queries: usize,
    /// Dynamic pairs recorded for relaxation
    pub pairs: usize,
    /// Dynamic pairs lost to a full pair list
    pub dropped_pairs: usize,
    /// Dynamic-vs-static pairs recorded for relaxation
    pub static_pairs: usize,
    /// Dynamic-vs-static pairs lost to a full pair list
    pub dropped_static_pairs: usize,
    /// Collision callbacks delivered
    pub callbacks: usize,
}

impl FrameStats {
    /// Zero every counter
    pub fn reset(&mut self) {
        *self = FrameStats::default();
    }

    /// Whether any work was dropped this frame
    pub fn has_drops(&self) -> bool {
        self.dropped_cell_insertions > 0
            || self.truncated_queries > 0
            || self.dropped_pairs > 0
            || self.dropped_static_pairs > 0
    }

    /// Total work lost to capacity limits
    pub fn total_dropped(&self) -> usize {
        self.dropped_cell_insertions
            + self.truncated_queries
            + self.dropped_pairs
            + self.dropped_static_pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_and_reset() {
        let mut stats = FrameStats::default();
        assert!(!stats.has_drops());

        stats.pairs = 4;
        stats.dropped_pairs = 2;
        stats.truncated_queries = 1;
        assert!(stats.has_drops());
        assert_eq!(stats.total_dropped(), 3);

        stats.reset();
        assert_eq!(stats, FrameStats::default());
    }
}
