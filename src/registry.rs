//! Binding of gravebags to world entities: creation, rebinding after loss, removal.

use crate::error::Result;
use crate::host::{Transport, World};
use crate::manager::GravebagManager;
use crate::models::{AccountId, EntityId, Gravebag, ItemStack, Vec2, WorldId};
use crate::store::GravebagStore;

impl<S: GravebagStore, W: World, T: Transport> GravebagManager<S, W, T> {
    /// Persists a new bag and places it in the world.
    pub fn create_on_death(
        &mut self,
        world_id: WorldId,
        owner_account_id: AccountId,
        position: Vec2,
        inventory: Vec<ItemStack>,
        trash_item: ItemStack,
    ) -> Result<EntityId> {
        let id = self.store.insert(world_id, owner_account_id, position, &inventory, &trash_item)?;
        let bag = Gravebag::new(id, world_id, owner_account_id, position, inventory, trash_item)?;
        log::info!(
            "[GravebagSpawn] Created gravebag {} for account {} at ({:.1}, {:.1}) with {} occupied slots.",
            id, owner_account_id, position.x, position.y, bag.occupied_slots()
        );
        Ok(self.bind(bag))
    }

    /// Spawns the bag's entity at its stored position and records the binding.
    pub fn bind(&mut self, bag: Gravebag) -> EntityId {
        let marker = ItemStack::new(self.config.bag_entity_kind, 1, 0);
        let entity = self.world.spawn_entity(marker, bag.position);
        // Nobody may pick the marker up through the world; only the allocator empties a bag.
        self.world.set_interaction_owner(entity, None);
        self.transport.broadcast_ownership(entity);
        log::debug!("[GravebagSpawn] Bound gravebag {} to entity {}.", bag.id, entity);
        self.bags.insert(entity, bag);
        entity
    }

    /// Rebinds a bag whose entity went inactive or was reused for something else.
    /// Returns `true` when a fresh entity was spawned.
    pub fn ensure_presence(&mut self, entity: EntityId) -> bool {
        if self.entity_intact(entity) {
            return false;
        }
        let Some(bag) = self.bags.remove(&entity) else {
            return false;
        };
        log::warn!(
            "[GravebagSync] Entity {} of gravebag {} is missing or repurposed; respawning at ({:.1}, {:.1}).",
            entity, bag.id, bag.position.x, bag.position.y
        );
        self.forget_tracking(entity);
        self.bind(bag);
        true
    }

    /// Deletes a bag from storage and the world.
    pub fn remove(&mut self, entity: EntityId) -> Result<()> {
        let Some(bag) = self.bags.get(&entity) else {
            return Ok(());
        };
        let id = bag.id;
        if !self.store.delete(id)? {
            log::warn!("[GravebagStore] Gravebag {} had no row to delete.", id);
        }
        self.bags.remove(&entity);
        if self.entity_intact(entity) {
            self.world.retire(entity);
            self.transport.broadcast_entity_state(entity);
        } else {
            log::warn!("[GravebagPickup] Entity {} no longer holds gravebag {}; left in the world.", entity, id);
        }
        self.forget_tracking(entity);
        log::info!("[GravebagPickup] Deleted gravebag {} (entity {}).", id, entity);
        Ok(())
    }

    /// Whether `entity` is still an active gravebag marker.
    pub(crate) fn entity_intact(&self, entity: EntityId) -> bool {
        let bag_kind = self.config.bag_entity_kind;
        matches!(self.world.entity(entity), Some(e) if e.active && e.kind == bag_kind)
    }

    pub(crate) fn forget_tracking(&mut self, entity: EntityId) {
        self.near_bags.retain(|_, tracked| *tracked != entity);
    }
}
