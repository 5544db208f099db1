/******************************************************************************
 *                                                                            *
 * GravebagManager owns every live gravebag of the loaded world and reacts to *
 * the host's events. All state here is touched from the host's single event  *
 * dispatch context, one handler at a time.                                   *
 *                                                                            *
 ******************************************************************************/

use std::collections::HashMap;

use crate::config::GravebagConfig;
use crate::error::{GravebagError, Result};
use crate::host::{Actor, Transport, World};
use crate::layout::TOTAL_SLOTS;
use crate::models::{AccountId, EntityId, Gravebag, ItemStack, Vec2, WorldId};
use crate::store::GravebagStore;

/// What a rehydration pass restored.
#[derive(Debug, Default, PartialEq)]
pub struct RehydrateReport {
    pub restored: usize,
    pub rejected: usize,
}

/// A live bag as reported by `locate_bags`.
#[derive(Debug, Clone, PartialEq)]
pub struct BagSummary {
    pub entity: EntityId,
    pub position: Vec2,
    pub occupied_slots: usize,
}

pub struct GravebagManager<S, W, T> {
    pub(crate) config: GravebagConfig,
    pub(crate) store: S,
    pub(crate) world: W,
    pub(crate) transport: T,
    pub(crate) world_id: Option<WorldId>,
    /// Bound world entity -> bag. Rebuilt from stored positions on loss.
    pub(crate) bags: HashMap<EntityId, Gravebag>,
    /// Account -> bag entity it was last found standing at.
    pub(crate) near_bags: HashMap<AccountId, EntityId>,
}

impl<S: GravebagStore, W: World, T: Transport> GravebagManager<S, W, T> {
    pub fn new(config: GravebagConfig, store: S, world: W, transport: T) -> Self {
        GravebagManager {
            config,
            store,
            world,
            transport,
            world_id: None,
            bags: HashMap::new(),
            near_bags: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GravebagConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn bag(&self, entity: EntityId) -> Option<&Gravebag> {
        self.bags.get(&entity)
    }

    pub fn bag_count(&self) -> usize {
        self.bags.len()
    }

    pub fn tracked_near_bag(&self, account: AccountId) -> Option<EntityId> {
        self.near_bags.get(&account).copied()
    }

    // --- Events ---

    /// Loads every stored bag of `world_id` back into the world.
    pub fn on_world_ready(&mut self, world_id: WorldId) -> Result<RehydrateReport> {
        self.world_id = Some(world_id);
        let listing = self.store.list_by_world(world_id)?;
        let report = RehydrateReport { restored: listing.bags.len(), rejected: listing.rejected.len() };
        for (id, e) in &listing.rejected {
            log::warn!("[GravebagRehydrate] Row {} of world {} left in storage: {}", id, world_id, e);
        }
        for bag in listing.bags {
            self.bind(bag);
        }
        log::info!(
            "[GravebagRehydrate] World {} ready: {} gravebags restored, {} rejected.",
            world_id, report.restored, report.rejected
        );
        Ok(report)
    }

    /// Escrows a dying player's items. Returns the new bag's entity, if one was made.
    pub fn on_actor_death<A: Actor>(&mut self, actor: &A) -> Result<Option<EntityId>> {
        let Some(account) = actor.account_id() else {
            log::debug!("[GravebagDeath] Actor {} has no account, nothing escrowed.", actor.actor_id());
            return Ok(None);
        };
        if !actor.escrows_on_death() {
            return Ok(None);
        }
        let world_id = self.world_id.ok_or(GravebagError::WorldNotReady)?;

        let absent_to_empty = |stack: ItemStack| {
            if self.config.is_absent(&stack) { ItemStack::EMPTY } else { stack }
        };
        let inventory: Vec<ItemStack> = (0..TOTAL_SLOTS).map(|i| absent_to_empty(actor.peek(i))).collect();
        let trash_item = absent_to_empty(actor.peek_trash());

        if inventory.iter().all(ItemStack::is_empty) && trash_item.is_empty() {
            log::info!("[GravebagDeath] Account {} died with nothing to escrow.", account);
            return Ok(None);
        }

        // The host already scattered the items; take those copies back out of the world.
        let mut suppressed = 0;
        for stack in inventory.iter().chain(std::iter::once(&trash_item)).filter(|s| !s.is_empty()) {
            if self.world.suppress_death_drop(stack) {
                suppressed += 1;
            }
        }
        log::debug!("[GravebagDeath] Suppressed {} death drops for account {}.", suppressed, account);

        let entity = self.create_on_death(world_id, account, actor.position(), inventory, trash_item)?;
        Ok(Some(entity))
    }

    /// Proximity pass for a player that just moved.
    pub fn on_actor_moved<A: Actor>(&mut self, actor: &mut A) -> Result<()> {
        if actor.is_dead() {
            return Ok(());
        }
        self.sync_nearby(actor)
    }

    /// Every live bag owned by `account`.
    pub fn locate_bags(&self, account: AccountId) -> Vec<BagSummary> {
        let mut found: Vec<BagSummary> = self
            .bags
            .iter()
            .filter(|(_, bag)| bag.owner_account_id == account)
            .map(|(&entity, bag)| BagSummary {
                entity,
                position: bag.position,
                occupied_slots: bag.occupied_slots(),
            })
            .collect();
        found.sort_by_key(|summary| summary.entity);
        found
    }

    /// Tells the player where their bags are.
    pub fn report_bag_locations<A: Actor>(&mut self, actor: &A) {
        let Some(account) = actor.account_id() else { return };
        let bags = self.locate_bags(account);
        let id = actor.actor_id();
        if bags.is_empty() {
            self.transport.send_message(id, "You have no gravebags.");
            return;
        }
        for summary in bags {
            let text = format!(
                "Gravebag at ({:.0}, {:.0}) holding {} item(s).",
                summary.position.x, summary.position.y, summary.occupied_slots
            );
            self.transport.send_message(id, &text);
        }
    }

    pub(crate) fn owner_display_name(&self, account: AccountId) -> String {
        self.world
            .account_name(account)
            .unwrap_or_else(|| format!("account #{}", account))
    }
}
