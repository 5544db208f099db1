/******************************************************************************
 *                                                                            *
 * Pickup allocator. Moves a bag's contents back to its owner in three        *
 * phases: slot-preserving restore, capacity-limited give with a world drop   *
 * for whatever was admitted, then the trash slot. Whatever is left keeps     *
 * the bag alive; an emptied bag is deleted.                                  *
 *                                                                            *
 ******************************************************************************/

use crate::config::GravebagConfig;
use crate::error::{GravebagError, Result};
use crate::host::{Actor, Transport, World};
use crate::layout::{accessory_slots, locate_slot, TOTAL_SLOTS, TRASH_SLOT};
use crate::manager::GravebagManager;
use crate::models::{AccountId, EntityId, Gravebag, ItemKind, ItemStack, Vec2};
use crate::store::GravebagStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupOutcome {
    /// Items remain; the bag stays in the world with its updated contents stored.
    Retained,
    /// The bag was emptied and deleted.
    Removed,
}

/// Result of an explicit "pick up nearest" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearestPickup {
    Picked(PickupOutcome),
    NotOwner(EntityId),
    NothingNearby,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PickupTally {
    pub picked_up: usize,
    pub overflow: usize,
}

impl<S: GravebagStore, W: World, T: Transport> GravebagManager<S, W, T> {
    /// Gives the bag bound to `entity` to `actor`, who must own it.
    pub fn pickup<A: Actor>(&mut self, actor: &mut A, entity: EntityId) -> Result<PickupOutcome> {
        let Some(bag) = self.bags.get_mut(&entity) else {
            return Ok(PickupOutcome::Removed);
        };
        log::info!("[GravebagPickup] Actor {} picking up gravebag {} (entity {}).", actor.actor_id(), bag.id, entity);

        let tally = allocate(&self.config, bag, actor, &mut self.world, &mut self.transport)?;

        if tally.picked_up > 0 {
            let text = format!(
                "Picked up {} item(s) from your gravebag, {} remaining.",
                tally.picked_up, tally.overflow
            );
            self.transport.send_message(actor.actor_id(), &text);
        }

        if tally.overflow == 0 {
            self.remove(entity)?;
            return Ok(PickupOutcome::Removed);
        }
        if tally.picked_up == 0 {
            // Contents unchanged, nothing to write.
            return Ok(PickupOutcome::Retained);
        }

        // A bag with items left is never deleted; write failures go back to the caller.
        let id = bag.id;
        match self.store.update_inventory(id, &bag.inventory, &bag.trash_item) {
            Ok(true) => {
                log::info!("[GravebagPickup] Gravebag {} kept with {} stack(s) left.", id, tally.overflow);
                Ok(PickupOutcome::Retained)
            }
            Ok(false) => {
                log::error!("[GravebagPickup] Gravebag {} lost its row while items remain.", id);
                Err(GravebagError::MissingRow { id })
            }
            Err(e) => {
                log::error!("[GravebagPickup] Could not save remaining items of gravebag {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Out-of-band pickup request: the nearest owned bag within reach.
    pub fn pickup_nearest<A: Actor>(&mut self, actor: &mut A) -> Result<NearestPickup> {
        let Some(account) = actor.account_id() else {
            return Ok(NearestPickup::NothingNearby);
        };
        if actor.is_dead() {
            return Ok(NearestPickup::NothingNearby);
        }
        let pos = actor.position();

        let tracked = self
            .near_bags
            .get(&account)
            .copied()
            .filter(|&e| self.bags.contains_key(&e) && self.within_reach(e, pos));
        let target = match self.nearest_in_reach(account, pos, true) {
            Some(entity) => Some((entity, true)),
            None => tracked.or_else(|| self.nearest_in_reach(account, pos, false)).map(|e| (e, false)),
        };
        let Some((entity, owned)) = target else {
            self.transport.send_message(actor.actor_id(), "There is no gravebag within reach.");
            return Ok(NearestPickup::NothingNearby);
        };

        if self.ensure_presence(entity) {
            // Rebound to a new entity; this request targeted the old one.
            log::debug!("[GravebagPickup] Gravebag entity {} was respawned, request dropped.", entity);
            return Ok(NearestPickup::NothingNearby);
        }

        if owned {
            return Ok(NearestPickup::Picked(self.pickup(actor, entity)?));
        }
        let owner = self.bags[&entity].owner_account_id;
        let text = format!("This gravebag belongs to {}.", self.owner_display_name(owner));
        self.transport.send_message(actor.actor_id(), &text);
        self.near_bags.insert(account, entity);
        Ok(NearestPickup::NotOwner(entity))
    }

    /// Where the bag stands now: the bound entity's live position, or the stored one if
    /// the entity is gone.
    fn live_position(&self, entity: EntityId) -> Option<Vec2> {
        let bag = self.bags.get(&entity)?;
        if self.entity_intact(entity) {
            self.world.entity(entity).map(|e| e.position)
        } else {
            Some(bag.position)
        }
    }

    fn within_reach(&self, entity: EntityId, pos: Vec2) -> bool {
        self.live_position(entity)
            .is_some_and(|at| at.distance(pos) <= self.config.pickup_radius)
    }

    /// Closest bag within pickup reach that is (or is not) owned by `account`.
    fn nearest_in_reach(&self, account: AccountId, pos: Vec2, owned: bool) -> Option<EntityId> {
        self.bags
            .iter()
            .filter(|(_, bag)| (bag.owner_account_id == account) == owned)
            .filter_map(|(&entity, _)| Some((entity, self.live_position(entity)?.distance(pos))))
            .filter(|&(_, distance)| distance <= self.config.pickup_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, _)| entity)
    }
}

/// Runs all three phases against one bag, mutating it and the actor in place.
/// `overflow` counts every slot, trash included, that still holds items afterwards.
pub fn allocate<A: Actor, W: World, T: Transport>(
    config: &GravebagConfig,
    bag: &mut Gravebag,
    actor: &mut A,
    world: &mut W,
    transport: &mut T,
) -> Result<PickupTally> {
    let mut tally = PickupTally::default();
    let slot_preserving = actor.has_persistent_slots();

    let deferred = restore_slots(config, bag, actor, transport, slot_preserving, &mut tally)?;
    give_deferred(bag, actor, world, transport, &deferred, &mut tally);
    if slot_preserving {
        restore_trash(config, bag, actor, transport, &mut tally);
    } else {
        give_trash(config, bag, actor, world, transport, &mut tally);
    }
    Ok(tally)
}

// --- Put items back where they were worn or carried ---
fn restore_slots<A: Actor, T: Transport>(
    config: &GravebagConfig,
    bag: &mut Gravebag,
    actor: &mut A,
    transport: &mut T,
    slot_preserving: bool,
    tally: &mut PickupTally,
) -> Result<Vec<usize>> {
    let mut deferred = Vec::new();
    for index in 0..TOTAL_SLOTS {
        let stack = bag.inventory[index];
        if config.is_absent(&stack) {
            continue;
        }
        if !slot_preserving {
            deferred.push(index);
            continue;
        }

        let location = locate_slot(index)?;
        let fits = config.is_absent(&actor.peek(index))
            && !location.is_cursor()
            && !(location.is_accessory() && accessory_conflicts(config, actor, index, stack.kind));
        if fits {
            actor.put(index, stack);
            bag.inventory[index] = ItemStack::EMPTY;
            transport.send_slot_update(actor.actor_id(), index, stack.modifier);
            tally.picked_up += 1;
        } else {
            deferred.push(index);
        }
    }
    Ok(deferred)
}

/// Whether `kind` clashes with an accessory already worn in another accessory slot.
fn accessory_conflicts<A: Actor>(config: &GravebagConfig, actor: &A, index: usize, kind: ItemKind) -> bool {
    accessory_slots()
        .filter(|&slot| slot != index)
        .map(|slot| actor.peek(slot))
        .any(|worn| !config.is_absent(&worn) && config.accessories_conflict(worn.kind, kind))
}

// --- Give whatever general capacity admits ---
fn give_deferred<A: Actor, W: World, T: Transport>(
    bag: &mut Gravebag,
    actor: &mut A,
    world: &mut W,
    transport: &mut T,
    deferred: &[usize],
    tally: &mut PickupTally,
) {
    for &index in deferred {
        let stack = bag.inventory[index];
        let admitted = give_stack(actor, world, transport, stack);
        if admitted > 0 {
            bag.inventory[index] = stack.with_count(stack.count - admitted);
            tally.picked_up += 1;
        }
        if bag.inventory[index].count > 0 {
            tally.overflow += 1;
        }
    }
}

/// Commits what capacity admits of `stack` and drops exactly that amount for the actor.
/// Returns the admitted count.
fn give_stack<A: Actor, W: World, T: Transport>(
    actor: &mut A,
    world: &mut W,
    transport: &mut T,
    stack: ItemStack,
) -> u32 {
    let admitted = actor.capacity_check(&stack).min(stack.count);
    if admitted == 0 {
        return 0;
    }
    let given = stack.with_count(admitted);
    // Commit first so the next capacity check sees this stack already taken.
    let leftover = actor.insert_with_leftover(given);
    if !leftover.is_empty() {
        log::warn!(
            "[GravebagPickup] Actor {} refused {} of {} admitted units of kind {}.",
            actor.actor_id(), leftover.count, admitted, stack.kind
        );
    }
    // The client receives the items by collecting this drop, reserved for the actor.
    let dropped = world.spawn_entity(given, actor.position());
    world.set_interaction_owner(dropped, Some(actor.actor_id()));
    transport.broadcast_ownership(dropped);
    admitted
}

// --- Trash slot, restored in place ---
fn restore_trash<A: Actor, T: Transport>(
    config: &GravebagConfig,
    bag: &mut Gravebag,
    actor: &mut A,
    transport: &mut T,
    tally: &mut PickupTally,
) {
    let trash = bag.trash_item;
    if config.is_absent(&trash) {
        return;
    }
    if !config.is_absent(&actor.peek_trash()) {
        tally.overflow += 1;
        return;
    }
    actor.put_trash(trash);
    bag.trash_item = ItemStack::EMPTY;
    transport.send_slot_update(actor.actor_id(), TRASH_SLOT, trash.modifier);
    tally.picked_up += 1;
}

// --- Trash slot, for actors without a slot model ---
fn give_trash<A: Actor, W: World, T: Transport>(
    config: &GravebagConfig,
    bag: &mut Gravebag,
    actor: &mut A,
    world: &mut W,
    transport: &mut T,
    tally: &mut PickupTally,
) {
    let trash = bag.trash_item;
    if config.is_absent(&trash) {
        return;
    }
    let admitted = give_stack(actor, world, transport, trash);
    if admitted > 0 {
        bag.trash_item = trash.with_count(trash.count - admitted);
        tally.picked_up += 1;
    }
    if bag.trash_item.count > 0 {
        tally.overflow += 1;
    }
}
