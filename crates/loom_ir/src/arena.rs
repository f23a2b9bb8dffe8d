//! Generic arena for dense, ID-indexed storage of IR nodes.
//!
//! The [`Arena`] provides O(1) insertion, lookup, and removal by opaque
//! [`ArenaId`] keys. Removal leaves a tombstone: slots are never reused, so an
//! ID that outlives its node can never alias a newer node.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for opaque ID types used as arena keys.
///
/// Implementors must provide a bijection between `u32` indices and the ID type.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

/// A dense, ID-indexed container for IR nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    slots: Vec<Option<T>>,
    live: usize,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates a new item in the arena and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.slots.len() as u32);
        self.slots.push(Some(item));
        self.live += 1;
        id
    }

    /// Returns the ID the next call to [`alloc`](Self::alloc) will return.
    pub fn next_id(&self) -> I {
        I::from_raw(self.slots.len() as u32)
    }

    /// Returns a reference to the item with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds or its item was removed.
    pub fn get(&self, id: I) -> &T {
        match self.slots.get(id.as_raw() as usize) {
            Some(Some(item)) => item,
            _ => panic!("stale or foreign arena id {}", id.as_raw()),
        }
    }

    /// Returns a mutable reference to the item with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds or its item was removed.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        match self.slots.get_mut(id.as_raw() as usize) {
            Some(Some(item)) => item,
            _ => panic!("stale or foreign arena id {}", id.as_raw()),
        }
    }

    /// Returns the item with the given ID, or `None` if it was removed.
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.slots.get(id.as_raw() as usize)?.as_ref()
    }

    /// Mutable counterpart of [`try_get`](Self::try_get).
    pub fn try_get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.as_raw() as usize)?.as_mut()
    }

    /// Returns `true` if the ID refers to a live item.
    pub fn contains(&self, id: I) -> bool {
        self.try_get(id).is_some()
    }

    /// Removes the item with the given ID, returning it.
    ///
    /// Returns `None` if the item was already removed.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let item = self.slots.get_mut(id.as_raw() as usize)?.take();
        if item.is_some() {
            self.live -= 1;
        }
        item
    }

    /// Returns the number of live items in the arena.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the arena contains no live items.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over `(ID, &T)` pairs of live items in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (I::from_raw(i as u32), item)))
    }

    /// Iterates over references to live items in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ModuleId;

    #[test]
    fn alloc_and_get() {
        let mut arena: Arena<ModuleId, String> = Arena::new();
        let id = arena.alloc("hello".to_string());
        assert_eq!(arena[id], "hello");
    }

    #[test]
    fn get_mut_modifies() {
        let mut arena: Arena<ModuleId, String> = Arena::new();
        let id = arena.alloc("original".to_string());
        *arena.get_mut(id) = "modified".to_string();
        assert_eq!(arena[id], "modified");
    }

    #[test]
    fn remove_leaves_tombstone() {
        let mut arena: Arena<ModuleId, u32> = Arena::new();
        let a = arena.alloc(10);
        let b = arena.alloc(20);
        assert_eq!(arena.remove(a), Some(10));
        assert_eq!(arena.remove(a), None);
        assert!(!arena.contains(a));
        assert!(arena.contains(b));
        assert_eq!(arena.len(), 1);
        let c = arena.alloc(30);
        assert_ne!(c, a, "ids are never reused");
    }

    #[test]
    #[should_panic(expected = "stale or foreign arena id")]
    fn get_removed_panics() {
        let mut arena: Arena<ModuleId, u32> = Arena::new();
        let a = arena.alloc(1);
        arena.remove(a);
        let _ = arena.get(a);
    }

    #[test]
    fn iter_skips_removed() {
        let mut arena: Arena<ModuleId, &str> = Arena::new();
        arena.alloc("a");
        let b = arena.alloc("b");
        arena.alloc("c");
        arena.remove(b);
        let collected: Vec<_> = arena.values().copied().collect();
        assert_eq!(collected, vec!["a", "c"]);
        let ids: Vec<u32> = arena.iter().map(|(id, _)| id.as_raw()).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn next_id_matches_alloc() {
        let mut arena: Arena<ModuleId, u32> = Arena::new();
        let predicted = arena.next_id();
        assert_eq!(arena.alloc(5), predicted);
    }

    #[test]
    fn serde_roundtrip() {
        let mut arena: Arena<ModuleId, String> = Arena::new();
        arena.alloc("first".to_string());
        let gone = arena.alloc("second".to_string());
        arena.remove(gone);
        let json = serde_json::to_string(&arena).unwrap();
        let restored: Arena<ModuleId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[ModuleId::from_raw(0)], "first");
        assert!(!restored.contains(gone));
    }

    #[test]
    fn default_is_empty() {
        let arena: Arena<ModuleId, u32> = Arena::default();
        assert!(arena.is_empty());
    }
}
