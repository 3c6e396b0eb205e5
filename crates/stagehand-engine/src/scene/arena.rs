use std::collections::HashMap;

use super::id::{DrawableId, MAX_ID};

/// Id-keyed storage with monotonic, never-reused ids.
#[derive(Debug)]
pub struct Arena<T> {
    next: u32,
    slots: HashMap<DrawableId, T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { next: 1, slots: HashMap::new() }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id and stores the value built for it.
    ///
    /// Returns `None` once the id space (24 bits, see [`MAX_ID`]) is exhausted.
    pub fn insert_with(&mut self, make: impl FnOnce(DrawableId) -> T) -> Option<DrawableId> {
        if self.next > MAX_ID {
            return None;
        }
        let id = DrawableId::new(self.next);
        self.next += 1;
        self.slots.insert(id, make(id));
        Some(id)
    }

    #[inline]
    pub fn remove(&mut self, id: DrawableId) -> Option<T> {
        self.slots.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: DrawableId) -> Option<&T> {
        self.slots.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut T> {
        self.slots.get_mut(&id)
    }

    #[inline]
    pub fn contains(&self, id: DrawableId) -> bool {
        self.slots.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Live values in no particular order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.values_mut()
    }
}
