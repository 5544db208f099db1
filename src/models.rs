use crate::error::{GravebagError, Result};
use crate::layout::TOTAL_SLOTS;

pub type BagId = u32;
pub type WorldId = u32;
pub type AccountId = u32;
pub type ActorId = u32;
pub type EntityId = u32;
pub type ItemKind = i32;

/// Item kind of an empty slot.
pub const NONE_KIND: ItemKind = 0;

/// A world position in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    #[inline]
    pub fn distance_squared(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// A quantity of one item type. Equality compares all three fields.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ItemStack {
    pub kind: ItemKind,
    pub count: u32,
    pub modifier: i32,
}

impl ItemStack {
    pub const EMPTY: ItemStack = ItemStack { kind: NONE_KIND, count: 0, modifier: 0 };

    pub fn new(kind: ItemKind, count: u32, modifier: i32) -> Self {
        ItemStack { kind, count, modifier }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == NONE_KIND || self.count == 0
    }

    /// Same kind and modifier, different count.
    pub fn with_count(&self, count: u32) -> Self {
        ItemStack { count, ..*self }
    }
}

/// The persisted escrow container for a dead player's inventory.
#[derive(Clone, Debug, PartialEq)]
pub struct Gravebag {
    pub id: BagId,
    pub world_id: WorldId,
    pub owner_account_id: AccountId,
    pub position: Vec2,
    /// Always exactly `TOTAL_SLOTS` long, indexed by the slot layout.
    pub inventory: Vec<ItemStack>,
    pub trash_item: ItemStack,
}

impl Gravebag {
    pub fn new(
        id: BagId,
        world_id: WorldId,
        owner_account_id: AccountId,
        position: Vec2,
        inventory: Vec<ItemStack>,
        trash_item: ItemStack,
    ) -> Result<Self> {
        check_slot_count(&inventory)?;
        Ok(Gravebag { id, world_id, owner_account_id, position, inventory, trash_item })
    }

    /// Number of slots (trash included) still holding something.
    pub fn occupied_slots(&self) -> usize {
        self.inventory.iter().filter(|s| !s.is_empty()).count()
            + usize::from(!self.trash_item.is_empty())
    }
}

pub(crate) fn check_slot_count(inventory: &[ItemStack]) -> Result<()> {
    if inventory.len() != TOTAL_SLOTS {
        return Err(GravebagError::SlotCount { expected: TOTAL_SLOTS, found: inventory.len() });
    }
    Ok(())
}

/// State of a world entity as polled from the host world.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldEntity {
    pub active: bool,
    pub kind: ItemKind,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl WorldEntity {
    /// Settled entities are at rest and eligible for position persistence.
    pub fn is_settled(&self) -> bool {
        self.velocity.is_zero()
    }
}
