/******************************************************************************
 *                                                                            *
 * Persistence contract for gravebags: one relation keyed by an auto-         *
 * incrementing id, with the inventory and trash stored as codec text. The    *
 * in-process MemoryStore keeps rows in exactly that shape.                   *
 *                                                                            *
 ******************************************************************************/

use std::collections::BTreeMap;

use crate::codec;
use crate::error::{GravebagError, Result};
use crate::models::{check_slot_count, AccountId, BagId, Gravebag, ItemStack, Vec2, WorldId};

/// Rows of one world, split into decoded bags and rows that failed to decode.
#[derive(Debug, Default)]
pub struct StoreListing {
    pub bags: Vec<Gravebag>,
    pub rejected: Vec<(BagId, GravebagError)>,
}

/// CRUD over the gravebag relation. The boolean results report whether a row was affected.
pub trait GravebagStore {
    fn insert(
        &mut self,
        world_id: WorldId,
        owner_account_id: AccountId,
        position: Vec2,
        inventory: &[ItemStack],
        trash_item: &ItemStack,
    ) -> Result<BagId>;

    fn update_position(&mut self, id: BagId, position: Vec2) -> Result<bool>;

    fn update_inventory(&mut self, id: BagId, inventory: &[ItemStack], trash_item: &ItemStack) -> Result<bool>;

    fn delete(&mut self, id: BagId) -> Result<bool>;

    fn list_by_world(&self, world_id: WorldId) -> Result<StoreListing>;
}

/// A stored row, columns as persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct GravebagRecord {
    pub id: BagId,
    pub world_id: WorldId,
    pub account_id: AccountId,
    pub pos_x: f32,
    pub pos_y: f32,
    pub inventory: String,
    pub trash_item: String,
}

impl GravebagRecord {
    pub fn decode(&self) -> Result<Gravebag> {
        let inventory = codec::decode_inventory(&self.inventory)?;
        let trash_item = codec::decode_stack(&self.trash_item)?;
        Gravebag::new(
            self.id,
            self.world_id,
            self.account_id,
            Vec2::new(self.pos_x, self.pos_y),
            inventory,
            trash_item,
        )
    }
}

/// Encodes an inventory for writing, refusing anything that is not a full bag.
pub(crate) fn encode_inventory(inventory: &[ItemStack]) -> Result<String> {
    check_slot_count(inventory)?;
    Ok(codec::encode_stacks(inventory))
}

/// Splits decoded rows from malformed ones so one bad row never hides the rest.
pub(crate) fn collect_listing(records: impl IntoIterator<Item = GravebagRecord>) -> StoreListing {
    let mut listing = StoreListing::default();
    for record in records {
        match record.decode() {
            Ok(bag) => listing.bags.push(bag),
            Err(e) => {
                log::warn!("[GravebagStore] Skipping malformed row {}: {}", record.id, e);
                listing.rejected.push((record.id, e));
            }
        }
    }
    listing
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: BTreeMap<BagId, GravebagRecord>,
    next_id: BagId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: BagId) -> Option<&GravebagRecord> {
        self.rows.get(&id)
    }

    /// Stores a row verbatim, bypassing encoding. Lets hosts import rows from another backend.
    pub fn insert_record(&mut self, record: GravebagRecord) {
        self.next_id = self.next_id.max(record.id);
        self.rows.insert(record.id, record);
    }
}

impl GravebagStore for MemoryStore {
    fn insert(
        &mut self,
        world_id: WorldId,
        owner_account_id: AccountId,
        position: Vec2,
        inventory: &[ItemStack],
        trash_item: &ItemStack,
    ) -> Result<BagId> {
        let inventory = encode_inventory(inventory)?;
        self.next_id += 1;
        let id = self.next_id;
        self.rows.insert(
            id,
            GravebagRecord {
                id,
                world_id,
                account_id: owner_account_id,
                pos_x: position.x,
                pos_y: position.y,
                inventory,
                trash_item: codec::encode_stack(trash_item),
            },
        );
        Ok(id)
    }

    fn update_position(&mut self, id: BagId, position: Vec2) -> Result<bool> {
        Ok(match self.rows.get_mut(&id) {
            Some(row) => {
                row.pos_x = position.x;
                row.pos_y = position.y;
                true
            }
            None => false,
        })
    }

    fn update_inventory(&mut self, id: BagId, inventory: &[ItemStack], trash_item: &ItemStack) -> Result<bool> {
        let inventory = encode_inventory(inventory)?;
        Ok(match self.rows.get_mut(&id) {
            Some(row) => {
                row.inventory = inventory;
                row.trash_item = codec::encode_stack(trash_item);
                true
            }
            None => false,
        })
    }

    fn delete(&mut self, id: BagId) -> Result<bool> {
        Ok(self.rows.remove(&id).is_some())
    }

    fn list_by_world(&self, world_id: WorldId) -> Result<StoreListing> {
        Ok(collect_listing(
            self.rows.values().filter(|row| row.world_id == world_id).cloned(),
        ))
    }
}
