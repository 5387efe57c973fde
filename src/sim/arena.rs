//! Generational arena for frame-scoped entity populations
//!
//! Entities are never removed mid-pass. Collision and update code marks them
//! [`Lifecycle::PendingRemoval`], and [`Arena::sweep`] drops them once per
//! frame. Handles carry a generation, so a handle to a swept slot stays dead
//! even after the slot is reused.

use std::fmt;

/// Stable reference to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}g{}", self.index, self.generation)
    }
}

/// Entity lifecycle within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    /// Removed at the next sweep
    PendingRemoval,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    lifecycle: Lifecycle,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    entry: Option<Entry<T>>,
}

#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Handle {
        let entry = Some(Entry {
            value,
            lifecycle: Lifecycle::Active,
        });
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = entry;
            Handle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry,
            });
            Handle {
                index,
                generation: 0,
            }
        }
    }

    fn entry(&self, handle: Handle) -> Option<&Entry<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_ref())
    }

    fn entry_mut(&mut self, handle: Handle) -> Option<&mut Entry<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_mut())
    }

    /// Value behind a live handle (active or pending removal)
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.entry(handle).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.entry_mut(handle).map(|e| &mut e.value)
    }

    pub fn lifecycle(&self, handle: Handle) -> Option<Lifecycle> {
        self.entry(handle).map(|e| e.lifecycle)
    }

    pub fn is_active(&self, handle: Handle) -> bool {
        self.lifecycle(handle) == Some(Lifecycle::Active)
    }

    /// Returns true if this call moved the entity out of `Active`
    pub fn mark_for_removal(&mut self, handle: Handle) -> bool {
        match self.entry_mut(handle) {
            Some(entry) if entry.lifecycle == Lifecycle::Active => {
                entry.lifecycle = Lifecycle::PendingRemoval;
                true
            }
            _ => false,
        }
    }

    /// Handles of all active entities, in slot order
    pub fn active_handles(&self) -> Vec<Handle> {
        self.iter_active().map(|(h, _)| h).collect()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry
                .as_ref()
                .filter(|e| e.lifecycle == Lifecycle::Active)
                .map(|e| {
                    (
                        Handle {
                            index: i as u32,
                            generation: slot.generation,
                        },
                        &e.value,
                    )
                })
        })
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.entry
                .as_mut()
                .filter(|e| e.lifecycle == Lifecycle::Active)
                .map(|e| {
                    (
                        Handle {
                            index: i as u32,
                            generation,
                        },
                        &mut e.value,
                    )
                })
        })
    }

    /// Drop every entity pending removal. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let mut removed = 0;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let pending = slot
                .entry
                .as_ref()
                .is_some_and(|e| e.lifecycle == Lifecycle::PendingRemoval);
            if pending {
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(i as u32);
                removed += 1;
            }
        }
        self.len -= removed;
        removed
    }

    /// Entities in either lifecycle state
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn active_len(&self) -> usize {
        self.iter_active().count()
    }

    pub fn pending_len(&self) -> usize {
        self.len - self.active_len()
    }

    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(i as u32);
            }
        }
        self.len = 0;
    }
}
