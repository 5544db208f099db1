//! Seams to the host server: the world that owns entities, the transport that
//! talks to clients, and the player acting in an event.

use crate::models::{AccountId, ActorId, EntityId, ItemStack, Vec2, WorldEntity};

pub trait World {
    /// Spawns an item entity at rest holding `stack`.
    fn spawn_entity(&mut self, stack: ItemStack, position: Vec2) -> EntityId;

    /// Polls an entity slot. `None` when the id was never handed out.
    fn entity(&self, id: EntityId) -> Option<WorldEntity>;

    /// Reserves pickup of an entity for one player. `None` reserves it for nobody.
    fn set_interaction_owner(&mut self, id: EntityId, owner: Option<ActorId>);

    fn retire(&mut self, id: EntityId);

    /// Removes the loose copy of `stack` the host dropped for a death.
    /// Returns whether a matching entity was found.
    fn suppress_death_drop(&mut self, stack: &ItemStack) -> bool;

    fn account_name(&self, _account: AccountId) -> Option<String> {
        None
    }
}

/// Fire-and-forget client messaging.
pub trait Transport {
    fn broadcast_ownership(&mut self, entity: EntityId);
    /// Sends an entity's current state to every client.
    fn broadcast_entity_state(&mut self, entity: EntityId);
    /// Sends an entity's current state to one client.
    fn send_entity_state(&mut self, actor: ActorId, entity: EntityId);
    fn send_slot_update(&mut self, actor: ActorId, slot: usize, modifier: i32);
    fn send_message(&mut self, actor: ActorId, text: &str);
}

/// A connected player. Slot indices use the flat bag layout.
pub trait Actor {
    fn actor_id(&self) -> ActorId;
    /// `None` for guests that are not logged in.
    fn account_id(&self) -> Option<AccountId>;
    fn position(&self) -> Vec2;
    fn is_dead(&self) -> bool;

    /// Whether the server keeps an authoritative copy of this player's slots.
    fn has_persistent_slots(&self) -> bool;
    /// Whether this player's ruleset moves their items into a bag on death.
    fn escrows_on_death(&self) -> bool;

    fn peek(&self, slot: usize) -> ItemStack;
    fn put(&mut self, slot: usize, stack: ItemStack);
    fn peek_trash(&self) -> ItemStack;
    fn put_trash(&mut self, stack: ItemStack);

    /// How many units of `stack` the player's general inventory would admit right now.
    fn capacity_check(&self, stack: &ItemStack) -> u32;
    /// Gives `stack` to the player and returns what did not fit.
    fn insert_with_leftover(&mut self, stack: ItemStack) -> ItemStack;
}
