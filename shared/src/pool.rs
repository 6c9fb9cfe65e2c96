/// An entity that can sit in a [`Pool`] slot.
pub trait Slot: Default {
    fn is_active(&self) -> bool;
    fn deactivate(&mut self);
}

/// Fixed-capacity dense storage.
///
/// Slots `[0, len)` are live. Slots `[len, capacity)` are kept inactive.
/// Removal swaps the last live slot into the hole, so iteration order is not
/// stable across removals.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
    len: usize,
}

impl<T: Slot + Clone> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity],
            len: 0,
        }
    }
}

impl<T: Slot> Pool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.slots.len()
    }

    /// Free slots left before the pool is full.
    pub fn remaining(&self) -> usize {
        self.slots.len() - self.len
    }

    /// Appends `item` and returns its slot index. A full pool drops the item.
    pub fn push(&mut self, item: T) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let index = self.len;
        self.slots[index] = item;
        self.len += 1;
        Some(index)
    }

    /// Removes the live entry at `index` by moving the last live entry into
    /// its place.
    pub fn swap_remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let last = self.len - 1;
        self.slots.swap(index, last);
        self.len = last;
        let mut removed = std::mem::take(&mut self.slots[last]);
        removed.deactivate();
        Some(removed)
    }

    /// Shrinks the live range to `len` and deactivates everything after it.
    pub fn truncate_to(&mut self, len: usize) {
        let len = len.min(self.slots.len());
        for slot in &mut self.slots[len..] {
            slot.deactivate();
        }
        self.len = len;
    }

    pub fn clear(&mut self) {
        self.truncate_to(0);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots[..self.len].get_mut(index)
    }

    /// The live range.
    pub fn as_slice(&self) -> &[T] {
        &self.slots[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.slots[..self.len].iter_mut()
    }

    /// Every slot up to capacity, including inactive ones.
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    pub fn active_count(&self) -> usize {
        self.iter().filter(|item| item.is_active()).count()
    }
}
