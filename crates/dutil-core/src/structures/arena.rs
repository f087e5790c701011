//! Generational slot arena
//!
//! Linked structures keep their nodes here and link them by [`Index`]. A slot
//! freed by `remove` or `clear` gets a new generation, so an index to the old
//! occupant is never resolved again even when the slot is reused.

use crate::types::{Error, Result};

/// Stable handle to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index {
    slot: u32,
    generation: u32,
}

impl Index {
    /// Slot number; unique among live entries
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot as usize
    }

    /// Generation of the slot when this index was issued
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// Slot arena with free-slot reuse
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no entry is live
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever created; every live index has `slot() < slot_count()`
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Store a value; fails only when the slot vector cannot grow
    pub fn insert(&mut self, value: T) -> Result<Index> {
        if let Some(slot) = self.free_head {
            if let Some(&Slot::Vacant { generation, next_free }) = self.slots.get(slot as usize) {
                self.slots[slot as usize] = Slot::Occupied { generation, value };
                self.free_head = next_free;
                self.len += 1;
                return Ok(Index { slot, generation });
            }
        }

        let slot = u32::try_from(self.slots.len()).map_err(|_| Error::OutOfMemory)?;
        self.slots.try_reserve(1)?;
        self.slots.push(Slot::Occupied { generation: 0, value });
        self.len += 1;
        Ok(Index { slot, generation: 0 })
    }

    /// Remove and return the value at `index`
    pub fn remove(&mut self, index: Index) -> Option<T> {
        if !self.contains(index) {
            return None;
        }
        let entry = &mut self.slots[index.slot as usize];
        let vacant = Slot::Vacant {
            generation: index.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        match std::mem::replace(entry, vacant) {
            Slot::Occupied { value, .. } => {
                self.free_head = Some(index.slot);
                self.len -= 1;
                Some(value)
            }
            Slot::Vacant { .. } => None,
        }
    }

    /// Check whether `index` designates a live entry
    #[inline]
    pub fn contains(&self, index: Index) -> bool {
        matches!(
            self.slots.get(index.slot as usize),
            Some(Slot::Occupied { generation, .. }) if *generation == index.generation
        )
    }

    /// Borrow the value at `index`
    #[inline]
    pub fn get(&self, index: Index) -> Option<&T> {
        match self.slots.get(index.slot as usize) {
            Some(Slot::Occupied { generation, value }) if *generation == index.generation => Some(value),
            _ => None,
        }
    }

    /// Mutably borrow the value at `index`
    #[inline]
    pub fn get_mut(&mut self, index: Index) -> Option<&mut T> {
        match self.slots.get_mut(index.slot as usize) {
            Some(Slot::Occupied { generation, value }) if *generation == index.generation => Some(value),
            _ => None,
        }
    }

    /// Live entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Index, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(slot, entry)| match entry {
            Slot::Occupied { generation, value } => Some((
                Index {
                    slot: slot as u32,
                    generation: *generation,
                },
                value,
            )),
            Slot::Vacant { .. } => None,
        })
    }

    /// Drop every entry; slot memory is kept and all issued indices go stale
    pub fn clear(&mut self) {
        let mut free_head = None;
        for (slot, entry) in self.slots.iter_mut().enumerate().rev() {
            let generation = match entry {
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
                Slot::Vacant { generation, .. } => *generation,
            };
            *entry = Slot::Vacant {
                generation,
                next_free: free_head,
            };
            free_head = Some(slot as u32);
        }
        self.free_head = free_head;
        self.len = 0;
    }
}
