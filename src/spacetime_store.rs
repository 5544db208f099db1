/******************************************************************************
 *                                                                            *
 * SpacetimeDB backend for the gravebag relation. Rows live in the public     *
 * `gravebag` table so clients can subscribe to them like any other world    *
 * container.                                                                 *
 *                                                                            *
 ******************************************************************************/

use spacetimedb::{ReducerContext, Table};

use crate::codec;
use crate::error::{self, GravebagError};
use crate::models::{AccountId, BagId, ItemStack, Vec2, WorldId};
use crate::store::{collect_listing, encode_inventory, GravebagRecord, GravebagStore, StoreListing};

#[spacetimedb::table(name = gravebag, public)]
#[derive(Clone, Debug)]
pub struct GravebagRow {
    #[primary_key]
    #[auto_inc]
    pub id: u32,
    #[index(btree)]
    pub world_id: u32,
    pub account_id: u32,
    pub pos_x: f32,
    pub pos_y: f32,
    pub inventory: String,  // codec text, TOTAL_SLOTS stacks
    pub trash_item: String, // codec text, one stack
}

impl From<GravebagRow> for GravebagRecord {
    fn from(row: GravebagRow) -> Self {
        GravebagRecord {
            id: row.id,
            world_id: row.world_id,
            account_id: row.account_id,
            pos_x: row.pos_x,
            pos_y: row.pos_y,
            inventory: row.inventory,
            trash_item: row.trash_item,
        }
    }
}

/// Store bound to the reducer call currently running.
pub struct SpacetimeGravebagStore<'a> {
    ctx: &'a ReducerContext,
}

impl<'a> SpacetimeGravebagStore<'a> {
    pub fn new(ctx: &'a ReducerContext) -> Self {
        SpacetimeGravebagStore { ctx }
    }
}

impl GravebagStore for SpacetimeGravebagStore<'_> {
    fn insert(
        &mut self,
        world_id: WorldId,
        owner_account_id: AccountId,
        position: Vec2,
        inventory: &[ItemStack],
        trash_item: &ItemStack,
    ) -> error::Result<BagId> {
        let new_row = GravebagRow {
            id: 0, // Auto-incremented
            world_id,
            account_id: owner_account_id,
            pos_x: position.x,
            pos_y: position.y,
            inventory: encode_inventory(inventory)?,
            trash_item: codec::encode_stack(trash_item),
        };
        match self.ctx.db.gravebag().try_insert(new_row) {
            Ok(inserted) => Ok(inserted.id),
            Err(e) => {
                log::error!("[GravebagStore] Failed to insert gravebag for account {}: {}", owner_account_id, e);
                Err(GravebagError::Store(format!("insert failed: {}", e)))
            }
        }
    }

    fn update_position(&mut self, id: BagId, position: Vec2) -> error::Result<bool> {
        let table = self.ctx.db.gravebag();
        match table.id().find(id) {
            Some(mut row) => {
                row.pos_x = position.x;
                row.pos_y = position.y;
                table.id().update(row);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_inventory(&mut self, id: BagId, inventory: &[ItemStack], trash_item: &ItemStack) -> error::Result<bool> {
        let encoded = encode_inventory(inventory)?;
        let table = self.ctx.db.gravebag();
        match table.id().find(id) {
            Some(mut row) => {
                row.inventory = encoded;
                row.trash_item = codec::encode_stack(trash_item);
                table.id().update(row);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&mut self, id: BagId) -> error::Result<bool> {
        Ok(self.ctx.db.gravebag().id().delete(id))
    }

    fn list_by_world(&self, world_id: WorldId) -> error::Result<StoreListing> {
        let rows = self.ctx.db.gravebag().world_id().filter(world_id);
        Ok(collect_listing(rows.map(GravebagRecord::from)))
    }
}
