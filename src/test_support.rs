//! Fake host collaborators shared by the unit tests.

use std::collections::HashMap;

use crate::config::GravebagConfig;
use crate::error::{GravebagError, Result};
use crate::host::{Actor, Transport, World};
use crate::layout::TOTAL_SLOTS;
use crate::manager::GravebagManager;
use crate::models::{AccountId, ActorId, BagId, EntityId, ItemKind, ItemStack, Vec2, WorldEntity, WorldId};
use crate::store::{GravebagStore, MemoryStore, StoreListing};

pub const BAG_KIND: ItemKind = crate::config::DEFAULT_BAG_ENTITY_KIND;

pub type TestManager = GravebagManager<RecordingStore, FakeWorld, FakeTransport>;

pub fn ready_manager(world_id: WorldId) -> TestManager {
    let mut manager = GravebagManager::new(
        GravebagConfig::default(),
        RecordingStore::default(),
        FakeWorld::default(),
        FakeTransport::default(),
    );
    manager.on_world_ready(world_id).unwrap();
    manager
}

pub fn inventory_with(slots: &[(usize, ItemStack)]) -> Vec<ItemStack> {
    let mut inventory = vec![ItemStack::EMPTY; TOTAL_SLOTS];
    for &(index, stack) in slots {
        inventory[index] = stack;
    }
    inventory
}

// --- Store ---

/// MemoryStore that counts writes and fails on demand.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub fail_insert: bool,
    pub fail_update_position: bool,
    pub fail_update_inventory: bool,
    pub fail_delete: bool,
    pub inserts: usize,
    pub position_updates: usize,
    pub inventory_updates: usize,
    pub deletes: usize,
}

impl RecordingStore {
    pub fn total_writes(&self) -> usize {
        self.inserts + self.position_updates + self.inventory_updates + self.deletes
    }
}

fn injected(op: &str) -> GravebagError {
    GravebagError::Store(format!("injected {} failure", op))
}

impl GravebagStore for RecordingStore {
    fn insert(
        &mut self,
        world_id: WorldId,
        owner_account_id: AccountId,
        position: Vec2,
        inventory: &[ItemStack],
        trash_item: &ItemStack,
    ) -> Result<BagId> {
        if self.fail_insert {
            return Err(injected("insert"));
        }
        self.inserts += 1;
        self.inner.insert(world_id, owner_account_id, position, inventory, trash_item)
    }

    fn update_position(&mut self, id: BagId, position: Vec2) -> Result<bool> {
        if self.fail_update_position {
            return Err(injected("position"));
        }
        self.position_updates += 1;
        self.inner.update_position(id, position)
    }

    fn update_inventory(&mut self, id: BagId, inventory: &[ItemStack], trash_item: &ItemStack) -> Result<bool> {
        if self.fail_update_inventory {
            return Err(injected("inventory"));
        }
        self.inventory_updates += 1;
        self.inner.update_inventory(id, inventory, trash_item)
    }

    fn delete(&mut self, id: BagId) -> Result<bool> {
        if self.fail_delete {
            return Err(injected("delete"));
        }
        self.deletes += 1;
        self.inner.delete(id)
    }

    fn list_by_world(&self, world_id: WorldId) -> Result<StoreListing> {
        self.inner.list_by_world(world_id)
    }
}

// --- World ---

#[derive(Debug, Clone)]
pub struct FakeEntity {
    pub state: WorldEntity,
    pub stack: ItemStack,
    pub owner: Option<ActorId>,
}

#[derive(Debug, Default)]
pub struct FakeWorld {
    pub entities: HashMap<EntityId, FakeEntity>,
    pub next_id: EntityId,
    pub spawn_count: usize,
    /// Loose items the host scattered on death.
    pub death_drops: Vec<ItemStack>,
    pub names: HashMap<AccountId, String>,
}

impl FakeWorld {
    pub fn move_entity(&mut self, id: EntityId, position: Vec2, velocity: Vec2) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.state.position = position;
            entity.state.velocity = velocity;
        }
    }

    pub fn deactivate(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.state.active = false;
        }
    }

    /// Another system reused the entity slot for a different item.
    pub fn repurpose(&mut self, id: EntityId, kind: ItemKind) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.state.kind = kind;
            entity.stack = ItemStack::new(kind, 1, 0);
        }
    }

    pub fn active_of_kind(&self, kind: ItemKind) -> Vec<(EntityId, &FakeEntity)> {
        let mut found: Vec<_> = self
            .entities
            .iter()
            .filter(|(_, e)| e.state.active && e.state.kind == kind)
            .map(|(&id, e)| (id, e))
            .collect();
        found.sort_by_key(|(id, _)| *id);
        found
    }

    /// Stacks of active entities reserved for `actor`, in spawn order.
    pub fn drops_owned_by(&self, actor: ActorId) -> Vec<ItemStack> {
        let mut drops: Vec<_> = self
            .entities
            .iter()
            .filter(|(_, e)| e.state.active && e.owner == Some(actor))
            .map(|(&id, e)| (id, e.stack))
            .collect();
        drops.sort_by_key(|(id, _)| *id);
        drops.into_iter().map(|(_, stack)| stack).collect()
    }
}

impl World for FakeWorld {
    fn spawn_entity(&mut self, stack: ItemStack, position: Vec2) -> EntityId {
        self.next_id += 1;
        self.spawn_count += 1;
        let id = self.next_id;
        self.entities.insert(
            id,
            FakeEntity {
                state: WorldEntity { active: true, kind: stack.kind, position, velocity: Vec2::ZERO },
                stack,
                owner: None,
            },
        );
        id
    }

    fn entity(&self, id: EntityId) -> Option<WorldEntity> {
        self.entities.get(&id).map(|e| e.state)
    }

    fn set_interaction_owner(&mut self, id: EntityId, owner: Option<ActorId>) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.owner = owner;
        }
    }

    fn retire(&mut self, id: EntityId) {
        self.deactivate(id);
    }

    fn suppress_death_drop(&mut self, stack: &ItemStack) -> bool {
        match self.death_drops.iter().position(|d| d == stack) {
            Some(i) => {
                self.death_drops.remove(i);
                true
            }
            None => false,
        }
    }

    fn account_name(&self, account: AccountId) -> Option<String> {
        self.names.get(&account).cloned()
    }
}

// --- Transport ---

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Ownership(EntityId),
    EntityStateAll(EntityId),
    EntityState(ActorId, EntityId),
    SlotUpdate(ActorId, usize, i32),
    Message(ActorId, String),
}

#[derive(Debug, Default)]
pub struct FakeTransport {
    pub sent: Vec<Sent>,
}

impl FakeTransport {
    pub fn messages_to(&self, actor: ActorId) -> Vec<String> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Message(to, text) if *to == actor => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Transport for FakeTransport {
    fn broadcast_ownership(&mut self, entity: EntityId) {
        self.sent.push(Sent::Ownership(entity));
    }

    fn broadcast_entity_state(&mut self, entity: EntityId) {
        self.sent.push(Sent::EntityStateAll(entity));
    }

    fn send_entity_state(&mut self, actor: ActorId, entity: EntityId) {
        self.sent.push(Sent::EntityState(actor, entity));
    }

    fn send_slot_update(&mut self, actor: ActorId, slot: usize, modifier: i32) {
        self.sent.push(Sent::SlotUpdate(actor, slot, modifier));
    }

    fn send_message(&mut self, actor: ActorId, text: &str) {
        self.sent.push(Sent::Message(actor, text.to_string()));
    }
}

// --- Actor ---

#[derive(Debug, Clone)]
pub struct FakeActor {
    pub id: ActorId,
    pub account: Option<AccountId>,
    pub position: Vec2,
    pub dead: bool,
    pub persistent_slots: bool,
    pub escrows: bool,
    pub slots: Vec<ItemStack>,
    pub trash: ItemStack,
    /// Remaining general capacity per kind; kinds not listed admit `default_capacity`.
    pub capacity: HashMap<ItemKind, u32>,
    pub default_capacity: u32,
    /// Everything committed through `insert_with_leftover`.
    pub given: Vec<ItemStack>,
}

impl FakeActor {
    pub fn new(id: ActorId, account: AccountId, position: Vec2) -> Self {
        FakeActor {
            id,
            account: Some(account),
            position,
            dead: false,
            persistent_slots: true,
            escrows: true,
            slots: vec![ItemStack::EMPTY; TOTAL_SLOTS],
            trash: ItemStack::EMPTY,
            capacity: HashMap::new(),
            default_capacity: u32::MAX,
            given: Vec::new(),
        }
    }
}

impl Actor for FakeActor {
    fn actor_id(&self) -> ActorId {
        self.id
    }

    fn account_id(&self) -> Option<AccountId> {
        self.account
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn has_persistent_slots(&self) -> bool {
        self.persistent_slots
    }

    fn escrows_on_death(&self) -> bool {
        self.escrows
    }

    fn peek(&self, slot: usize) -> ItemStack {
        self.slots[slot]
    }

    fn put(&mut self, slot: usize, stack: ItemStack) {
        self.slots[slot] = stack;
    }

    fn peek_trash(&self) -> ItemStack {
        self.trash
    }

    fn put_trash(&mut self, stack: ItemStack) {
        self.trash = stack;
    }

    fn capacity_check(&self, stack: &ItemStack) -> u32 {
        self.capacity
            .get(&stack.kind)
            .copied()
            .unwrap_or(self.default_capacity)
            .min(stack.count)
    }

    fn insert_with_leftover(&mut self, stack: ItemStack) -> ItemStack {
        let admitted = self.capacity_check(&stack);
        if let Some(left) = self.capacity.get_mut(&stack.kind) {
            *left -= admitted;
        }
        if admitted > 0 {
            self.given.push(stack.with_count(admitted));
        }
        stack.with_count(stack.count - admitted)
    }
}
