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
//! Actor storage
//!
//! Actors are owned by an [`ActorArena`] and referenced through lightweight
//! [`ActorHandle`]s. Each slot carries a generation counter that is bumped on
//! removal, so a handle kept past its actor's lifetime resolves to `None`
//! instead of aliasing whatever reuses the slot.

use std::fmt;

use crate::body::Actor;

/// Generational handle to an actor in an [`ActorArena`]
///
/// Ordering compares the slot index first, which gives the collision
/// pipeline a stable tie-break for visiting each unordered pair once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorHandle {
    index: u32,
    generation: u32,
}

impl ActorHandle {
    /// Create a handle from raw parts
    pub fn new(index: u32, generation: u32) -> Self {
        ActorHandle { index, generation }
    }

    /// Slot index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation number
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({}, gen: {})", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

/// Slot storage for actors with free-list reuse
///
/// Registration and removal are O(1). Slots are never shrunk, so the arena
/// only allocates when it grows past its previous peak.
#[derive(Debug, Clone, Default)]
pub struct ActorArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl ActorArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena with room for `capacity` actors
    pub fn with_capacity(capacity: usize) -> Self {
        ActorArena {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Store an actor and return its handle
    pub fn insert(&mut self, actor: Actor) -> ActorHandle {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.actor = Some(actor);
            return ActorHandle::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            actor: Some(actor),
        });
        ActorHandle::new(index, 0)
    }

    /// Remove an actor, invalidating every outstanding handle to it
    pub fn remove(&mut self, handle: ActorHandle) -> Option<Actor> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let actor = slot.actor.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(actor)
    }

    /// Whether the handle still refers to a live actor
    pub fn contains(&self, handle: ActorHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Borrow an actor
    pub fn get(&self, handle: ActorHandle) -> Option<&Actor> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.actor.as_ref()
    }

    /// Mutably borrow an actor
    pub fn get_mut(&mut self, handle: ActorHandle) -> Option<&mut Actor> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.actor.as_mut()
    }

    /// Mutably borrow two distinct actors at once
    ///
    /// Returns `None` if either handle is stale or both name the same slot.
    pub fn get_pair_mut(
        &mut self,
        a: ActorHandle,
        b: ActorHandle,
    ) -> Option<(&mut Actor, &mut Actor)> {
        if a.index == b.index || !self.contains(a) || !self.contains(b) {
            return None;
        }

        let (ia, ib) = (a.index as usize, b.index as usize);
        let (first, second) = if ia < ib {
            let (lo, hi) = self.slots.split_at_mut(ib);
            (&mut lo[ia], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(ia);
            (&mut hi[0], &mut lo[ib])
        };

        match (first.actor.as_mut(), second.actor.as_mut()) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Handle of the live actor in slot `index`, if any
    ///
    /// Lets callers walk the arena by index while also holding it mutably.
    pub fn handle_at(&self, index: usize) -> Option<ActorHandle> {
        let slot = self.slots.get(index)?;
        slot.actor
            .as_ref()
            .map(|_| ActorHandle::new(index as u32, slot.generation))
    }

    /// Slots that fit without reallocating
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of slots ever allocated (live or free)
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of live actors
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no actors
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every actor
    ///
    /// Generations keep counting, so handles from before the clear stay stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.actor.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.len = 0;
    }

    /// Iterate over live actors with their handles
    pub fn iter(&self) -> impl Iterator<Item = (ActorHandle, &Actor)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.actor
                .as_ref()
                .map(|a| (ActorHandle::new(i as u32, slot.generation), a))
        })
    }

    /// Iterate mutably over live actors with their handles
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ActorHandle, &mut Actor)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.actor
                .as_mut()
                .map(|a| (ActorHandle::new(i as u32, generation), a))
        })
    }

    /// Mutable access to the raw actor slots for bulk updates
    pub(crate) fn actors_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.slots.iter_mut().filter_map(|slot| slot.actor.as_mut())
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn par_actors_mut(&mut self) -> impl rayon::iter::ParallelIterator<Item = &mut Actor> {
        use rayon::prelude::*;
        self.slots
            .par_iter_mut()
            .filter_map(|slot| slot.actor.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor::new(0.0, 0.0, 10, 10)
    }

    #[test]
    fn test_arena_lifecycle() {
        let mut arena = ActorArena::new();

        let a = arena.insert(actor());
        let b = arena.insert(actor());

        assert_eq!(arena.len(), 2);
        assert!(arena.contains(a));
        assert!(arena.contains(b));

        assert!(arena.remove(a).is_some());
        assert_eq!(arena.len(), 1);
        assert!(!arena.contains(a));
        assert!(arena.contains(b));
        assert!(arena.remove(a).is_none());
    }

    #[test]
    fn test_with_capacity_reserves_slots() {
        let mut arena = ActorArena::with_capacity(32);
        assert!(arena.capacity() >= 32);
        assert!(arena.is_empty());

        for _ in 0..32 {
            arena.insert(actor());
        }
        assert_eq!(arena.slot_count(), 32);
        assert!(arena.capacity() >= 32);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut arena = ActorArena::new();
        let a = arena.insert(actor());
        arena.remove(a);

        let b = arena.insert(actor());
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert!(arena.get(a).is_none());
        assert!(arena.get(b).is_some());
        assert_eq!(arena.slot_count(), 1);
    }

    #[test]
    fn test_get_pair_mut() {
        let mut arena = ActorArena::new();
        let a = arena.insert(actor());
        let b = arena.insert(Actor::new(5.0, 5.0, 10, 10));

        {
            let (x, y) = arena.get_pair_mut(b, a).expect("distinct live handles");
            x.width = 3;
            y.width = 4;
        }
        assert_eq!(arena.get(a).map(|x| x.width), Some(4));
        assert_eq!(arena.get(b).map(|x| x.width), Some(3));
        assert!(arena.get_pair_mut(a, a).is_none());
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut arena = ActorArena::new();
        let a = arena.insert(actor());
        arena.insert(actor());
        arena.clear();

        assert!(arena.is_empty());
        assert!(!arena.contains(a));
        assert_eq!(arena.iter().count(), 0);

        let c = arena.insert(actor());
        assert!(arena.contains(c));
        assert_eq!(arena.slot_count(), 2);
    }

    #[test]
    fn test_handle_at_skips_free_slots() {
        let mut arena = ActorArena::new();
        let a = arena.insert(actor());
        let b = arena.insert(actor());
        arena.remove(a);

        assert_eq!(arena.handle_at(0), None);
        assert_eq!(arena.handle_at(1), Some(b));
        assert_eq!(arena.handle_at(2), None);
    }
}
