//! Token slot table
//!
//! The portal tracks a fixed number of slots. A slot index is the token's
//! address in the protocol, so slots never move; placement only decides
//! which slot a newly detected token lands in.

use crate::token::{TokenDescriptor, TokenSlot, Uid};
use crate::TOKEN_LIMIT;

/// Errors from slot table operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotError {
    /// Every slot holds a loaded token
    TableFull,
    /// Slot index beyond the table
    InvalidSlot(usize),
    /// Slot holds no loaded token
    NotLoaded(usize),
}

/// Why a slot was picked for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Placement {
    /// Token returned to the slot that last held its identity
    Returning,
    /// Slot was never assigned
    Empty,
    /// Slot held a different token that is no longer present
    Reused,
}

/// Result of a successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// Token is already loaded in this slot; nothing changed
    AlreadyLoaded(usize),
    /// Token was copied into a slot
    Placed { slot: usize, placement: Placement },
}

impl LoadOutcome {
    /// Slot index holding the token
    pub fn slot(&self) -> usize {
        match self {
            LoadOutcome::AlreadyLoaded(slot) => *slot,
            LoadOutcome::Placed { slot, .. } => *slot,
        }
    }
}

/// Fixed table of token slots
#[derive(Debug, Clone)]
pub struct SlotTable<T> {
    slots: [TokenSlot<T>; TOKEN_LIMIT],
}

impl<T: Default> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> SlotTable<T> {
    /// Create a table with every slot unassigned
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| TokenSlot::default()),
        }
    }
}

impl<T> SlotTable<T> {
    /// Place a detected token
    ///
    /// Candidates are tried in order: the slot already holding this UID,
    /// the first never-assigned slot, then the first slot whose token is
    /// gone. Re-detecting a token that is still loaded is a no-op.
    pub fn load(&mut self, descriptor: TokenDescriptor<T>) -> Result<LoadOutcome, SlotError> {
        let (slot, placement) = match self.find_placement(descriptor.uid) {
            Some(Ok(slot)) => return Ok(LoadOutcome::AlreadyLoaded(slot)),
            Some(Err(found)) => found,
            None => return Err(SlotError::TableFull),
        };

        self.slots[slot].assign(descriptor);
        Ok(LoadOutcome::Placed { slot, placement })
    }

    /// Find the slot for a UID
    ///
    /// `Some(Ok(slot))` means the token is already loaded there.
    fn find_placement(&self, uid: Uid) -> Option<Result<usize, (usize, Placement)>> {
        if let Some(slot) = self.slots.iter().position(|s| s.uid == uid) {
            if self.slots[slot].loaded {
                return Some(Ok(slot));
            }
            return Some(Err((slot, Placement::Returning)));
        }

        if let Some(slot) = self.slots.iter().position(|s| s.uid.is_empty()) {
            return Some(Err((slot, Placement::Empty)));
        }

        self.slots
            .iter()
            .position(|s| !s.loaded)
            .map(|slot| Err((slot, Placement::Reused)))
    }

    /// Mark a slot's token as removed
    ///
    /// The UID is kept so the same token returns to this slot.
    pub fn unload(&mut self, slot: usize) -> Result<(), SlotError> {
        let entry = self.slots.get_mut(slot).ok_or(SlotError::InvalidSlot(slot))?;
        if !entry.loaded {
            return Err(SlotError::NotLoaded(slot));
        }
        entry.loaded = false;
        entry.changed = true;
        Ok(())
    }

    /// Flag every loaded slot as changed
    pub fn mark_loaded_changed(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.loaded) {
            slot.changed = true;
        }
    }

    pub fn get(&self, slot: usize) -> Option<&TokenSlot<T>> {
        self.slots.get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut TokenSlot<T>> {
        self.slots.get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenSlot<T>> {
        self.slots.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TokenSlot<T>> {
        self.slots.iter_mut()
    }

    /// Number of slots holding a loaded token
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.loaded).count()
    }
}
