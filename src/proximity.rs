/******************************************************************************
 *                                                                            *
 * Per-movement proximity pass. Keeps bag entities present, writes back      *
 * positions of bags that drifted and came to rest, keeps the mover's view    *
 * in sync, and hands bags to the pickup allocator when their owner arrives.  *
 *                                                                            *
 ******************************************************************************/

use crate::error::Result;
use crate::host::{Actor, Transport, World};
use crate::manager::GravebagManager;
use crate::models::{AccountId, EntityId, Vec2};
use crate::pickup::PickupOutcome;
use crate::store::GravebagStore;

impl<S: GravebagStore, W: World, T: Transport> GravebagManager<S, W, T> {
    /// Runs one proximity pass over all bags around `actor`.
    pub fn sync_nearby<A: Actor>(&mut self, actor: &mut A) -> Result<()> {
        let actor_pos = actor.position();
        let account = actor.account_id();

        // Bags can be removed by the allocator mid-pass.
        let entities: Vec<EntityId> = self.bags.keys().copied().collect();

        for entity in entities {
            let Some(bag) = self.bags.get(&entity) else { continue };
            if bag.position.distance(actor_pos) > self.config.sync_radius {
                if let Some(account) = account {
                    self.untrack(account, entity);
                }
                continue;
            }

            // --- Respawn a lost marker; it is handled on the next pass ---
            if self.ensure_presence(entity) {
                continue;
            }
            let Some(state) = self.world.entity(entity) else { continue };

            // --- Write back a settled drift ---
            self.settle_position(entity, state.position, state.is_settled());

            // --- Keep the mover's view current ---
            self.transport.send_entity_state(actor.actor_id(), entity);

            let Some(bag) = self.bags.get(&entity) else { continue };
            let owner = bag.owner_account_id;
            let in_reach = state.position.distance(actor_pos) <= self.config.pickup_radius;

            // --- Owner pickup, stranger notice, near-bag tracking ---
            let Some(account) = account else { continue };
            if in_reach {
                if owner == account {
                    log::debug!("[GravebagSync] Account {} reached own gravebag entity {}.", account, entity);
                    if self.pickup(actor, entity)? == PickupOutcome::Removed {
                        continue;
                    }
                } else if self.near_bags.get(&account) != Some(&entity) {
                    let text = format!("This gravebag belongs to {}.", self.owner_display_name(owner));
                    self.transport.send_message(actor.actor_id(), &text);
                    self.near_bags.insert(account, entity);
                }
            } else {
                self.untrack(account, entity);
            }
        }
        Ok(())
    }

    fn untrack(&mut self, account: AccountId, entity: EntityId) {
        if self.near_bags.get(&account) == Some(&entity) {
            self.near_bags.remove(&account);
        }
    }

    /// Persists a settled entity's position once it drifted past the threshold.
    /// A failed write is retried by the next qualifying movement.
    fn settle_position(&mut self, entity: EntityId, current: Vec2, settled: bool) {
        let Some(bag) = self.bags.get_mut(&entity) else { return };
        if !settled || current.distance(bag.position) <= self.config.settle_threshold {
            return;
        }
        match self.store.update_position(bag.id, current) {
            Ok(true) => {
                log::trace!(
                    "[GravebagSync] Gravebag {} settled at ({:.1}, {:.1}).",
                    bag.id, current.x, current.y
                );
                bag.position = current;
            }
            Ok(false) => {
                log::warn!("[GravebagSync] Gravebag {} has no row; position not saved.", bag.id);
            }
            Err(e) => {
                log::warn!("[GravebagSync] Could not save position of gravebag {}: {}", bag.id, e);
            }
        }
    }
}
