/******************************************************************************
 *                                                                            *
 * Static slot layout of a gravebag inventory. A bag stores every equipment   *
 * category back to back; this table maps a flat bag index to the category    *
 * and the index inside that category's surface on the player.                *
 *                                                                            *
 ******************************************************************************/

use crate::error::{GravebagError, Result};

pub const INVENTORY_SLOTS: usize = 59;
pub const ARMOR_SLOTS: usize = 20;
pub const DYE_SLOTS: usize = 10;
pub const MISC_EQUIP_SLOTS: usize = 5;
pub const MISC_DYE_SLOTS: usize = 5;

pub const TOTAL_SLOTS: usize =
    INVENTORY_SLOTS + ARMOR_SLOTS + DYE_SLOTS + MISC_EQUIP_SLOTS + MISC_DYE_SLOTS;

/// Local inventory index of the item held on the mouse cursor. Never restored into.
pub const CURSOR_SLOT: usize = 58;

/// Wire slot index of the player's trash slot.
pub const TRASH_SLOT: usize = 179;

/// Armor-local ranges holding accessories (functional, then vanity).
const ACCESSORY_RANGES: [(usize, usize); 2] = [(3, 10), (13, 20)];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotCategory {
    Inventory,
    Armor,
    Dye,
    MiscEquip,
    MiscDye,
}

/// `(category, first flat index, width)`, contiguous and in bag order.
pub const LAYOUT: [(SlotCategory, usize, usize); 5] = [
    (SlotCategory::Inventory, 0, INVENTORY_SLOTS),
    (SlotCategory::Armor, INVENTORY_SLOTS, ARMOR_SLOTS),
    (SlotCategory::Dye, INVENTORY_SLOTS + ARMOR_SLOTS, DYE_SLOTS),
    (SlotCategory::MiscEquip, INVENTORY_SLOTS + ARMOR_SLOTS + DYE_SLOTS, MISC_EQUIP_SLOTS),
    (
        SlotCategory::MiscDye,
        INVENTORY_SLOTS + ARMOR_SLOTS + DYE_SLOTS + MISC_EQUIP_SLOTS,
        MISC_DYE_SLOTS,
    ),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotLocation {
    pub category: SlotCategory,
    pub local_index: usize,
}

impl SlotLocation {
    pub fn is_cursor(&self) -> bool {
        self.category == SlotCategory::Inventory && self.local_index == CURSOR_SLOT
    }

    pub fn is_accessory(&self) -> bool {
        self.category == SlotCategory::Armor
            && ACCESSORY_RANGES.iter().any(|&(lo, hi)| (lo..hi).contains(&self.local_index))
    }
}

/// Maps a flat bag index to its category and local index.
pub fn locate_slot(index: usize) -> Result<SlotLocation> {
    LAYOUT
        .iter()
        .find(|(_, start, width)| (*start..start + width).contains(&index))
        .map(|&(category, start, _)| SlotLocation { category, local_index: index - start })
        .ok_or(GravebagError::Layout { index })
}

/// Flat bag indices of every accessory slot.
pub fn accessory_slots() -> impl Iterator<Item = usize> {
    ACCESSORY_RANGES
        .iter()
        .flat_map(|&(lo, hi)| (lo..hi).map(|local| INVENTORY_SLOTS + local))
}
