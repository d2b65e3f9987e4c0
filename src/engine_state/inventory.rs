//! # Inventory Module
//!
//! Block counts plus a nine slot hotbar. Mining adds to the inventory and a
//! newly seen block type takes the first free slot; placing from the selected
//! slot consumes one block, and a type whose count drops to zero frees its
//! slot. How the hotbar is drawn is up to the caller.

use std::collections::BTreeMap;

use super::voxels::block::block_type::BlockType;

/// Number of hotbar slots.
pub const HOTBAR_SLOT_COUNT: usize = 9;

/// Owned block counts and the hotbar mapping slots to block types.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Inventory {
    counts: BTreeMap<BlockType, u32>,
    slots: [Option<BlockType>; HOTBAR_SLOT_COUNT],
    selected: usize,
}

impl Inventory {
    /// Creates an empty inventory with slot 0 selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many blocks of `block_type` are held.
    pub fn count(&self, block_type: BlockType) -> u32 {
        self.counts.get(&block_type).copied().unwrap_or(0)
    }

    /// Adds `amount` blocks of `block_type`.
    pub fn add(&mut self, block_type: BlockType, amount: u32) {
        if amount == 0 {
            return;
        }
        let count = self.counts.entry(block_type).or_insert(0);
        let previous = *count;
        *count += amount;

        if previous == 0 && !self.slots.contains(&Some(block_type)) {
            if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) {
                *slot = Some(block_type);
            }
        }
        self.reselect_if_empty();
    }

    /// Takes `amount` blocks of `block_type`.
    ///
    /// # Returns
    /// `false`, leaving the inventory untouched, when none are held.
    pub fn remove(&mut self, block_type: BlockType, amount: u32) -> bool {
        let Some(count) = self.counts.get_mut(&block_type) else {
            return false;
        };
        if *count == 0 {
            return false;
        }

        *count = count.saturating_sub(amount);
        if *count == 0 {
            self.counts.remove(&block_type);
            for slot in self.slots.iter_mut() {
                if *slot == Some(block_type) {
                    *slot = None;
                }
            }
        }
        self.reselect_if_empty();
        true
    }

    /// Selects slot `index`, wrapping around the hotbar.
    pub fn select_slot(&mut self, index: usize) {
        self.selected = index % HOTBAR_SLOT_COUNT;
    }

    /// Index of the selected slot.
    pub fn selected_slot(&self) -> usize {
        self.selected
    }

    /// Block type of the selected slot, if it holds any blocks.
    pub fn selected_block_type(&self) -> Option<BlockType> {
        self.slots[self.selected].filter(|block_type| self.count(*block_type) > 0)
    }

    /// Block type assigned to each slot.
    pub fn slots(&self) -> &[Option<BlockType>; HOTBAR_SLOT_COUNT] {
        &self.slots
    }

    fn reselect_if_empty(&mut self) {
        if self.slots[self.selected].is_none() {
            self.selected = self.slots.iter().position(Option::is_some).unwrap_or(0);
        }
    }
}
