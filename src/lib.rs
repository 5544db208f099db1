//! Gravebags: escrow of a dead player's items in a recoverable, owner-scoped
//! world container that survives restarts.
//!
//! The host drives a [`GravebagManager`] from its single event-dispatch
//! context: [`GravebagManager::on_world_ready`] once the world is loaded,
//! [`GravebagManager::on_actor_death`] and [`GravebagManager::on_actor_moved`]
//! from the matching player events, and [`GravebagManager::pickup_nearest`]
//! for an explicit pickup request.

pub mod codec;
pub mod config;
pub mod error;
pub mod host;
pub mod layout;
pub mod models;
pub mod store;
#[cfg(feature = "spacetime")]
pub mod spacetime_store; // SpacetimeDB-backed relation

mod manager;
mod pickup; // Pickup allocator
mod proximity; // Per-movement proximity pass
mod registry; // Entity binding lifecycle

#[cfg(test)]
mod test_support;

pub use config::{GravebagConfig, IgnoredKinds};
pub use error::{FormatError, GravebagError, Result};
pub use host::{Actor, Transport, World};
pub use manager::{BagSummary, GravebagManager, RehydrateReport};
pub use models::{AccountId, ActorId, BagId, EntityId, Gravebag, ItemKind, ItemStack, Vec2, WorldEntity, WorldId};
pub use pickup::{allocate, NearestPickup, PickupOutcome, PickupTally};
pub use store::{GravebagRecord, GravebagStore, MemoryStore, StoreListing};

#[cfg(feature = "spacetime")]
pub use spacetime_store::SpacetimeGravebagStore;
