//! Cairn entity model: positioned entities, their owning containers, and the
//! capabilities actors and items carry.
//!
//! Every live entity sits in exactly one container, either a [`GameMap`] or
//! the [`Inventory`] of an actor, and knows which one through its
//! [`Owner`]. The [`World`] arena holds every live entity and keeps the two
//! sides of that relationship in step. Unplaced [`Entity`] values act as
//! prototypes: spawning one deep-clones it into a container.
//!
//! # Quick Start
//!
//! ```
//! use cairn_entity::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! struct Hostile;
//!
//! impl Ai for Hostile {
//!     fn label(&self) -> &str { "hostile" }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
//! }
//!
//! let goblin = ActorBuilder::new('g', Rgb(63, 127, 63), "Goblin")
//!     .ai(Hostile)
//!     .fighter(Fighter::new(10, 0, 3))
//!     .inventory(Inventory::new(0))
//!     .build()
//!     .unwrap();
//!
//! let mut world = World::new();
//! let cave = world.add_map(80, 45);
//! let id = goblin.spawn(&mut world, Owner::Map(cave), 5, 7).unwrap();
//!
//! assert_eq!(world.entity(id).unwrap().position(), (5, 7));
//! assert_eq!(world.gamemap(id), Ok(cave));
//! assert!(world.is_alive(id));
//! ```

#![deny(unsafe_code)]

pub mod actor;
pub mod capability;
pub mod command;
pub mod container;
pub mod entity;
pub mod integrity;
pub mod inventory;
pub mod item;
pub mod map;
pub mod object;
pub mod world;

pub use container::{Container, MapId, Owner};
pub use entity::{Entity, EntityId, EntityMut};
pub use inventory::Inventory;
pub use map::GameMap;
pub use world::World;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by entity and ownership operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The handle names a despawned or never-allocated entity.
    #[error("entity {0:?} does not exist (stale or never allocated)")]
    StaleEntity(EntityId),

    /// The parent chain ends without reaching a map.
    #[error("no game map reachable from {}", display_entity(.entity))]
    UnresolvedContainer { entity: Option<EntityId> },

    /// Strict removal of an entity its container does not list.
    #[error("{entity:?} is not a member of {owner}")]
    NotAMember { entity: EntityId, owner: Owner },

    #[error("no map registered as {0}")]
    UnknownMap(MapId),

    /// An inventory owner was requested from an entity that has none.
    #[error("entity {0:?} has no inventory to hold other entities")]
    NotAContainer(EntityId),

    #[error("entity {0:?} is not an actor")]
    NotAnActor(EntityId),

    /// The placement would put an entity inside its own inventory chain.
    #[error("placing {entity:?} into {owner} would make it carry itself")]
    OwnershipCycle { entity: EntityId, owner: Owner },

    /// A builder was finished without a required capability.
    #[error("{kind} is missing its {capability} capability")]
    MissingCapability {
        kind: &'static str,
        capability: &'static str,
    },

    /// A queued command lacks the target its kind requires.
    #[error("command #{0} has no target entity")]
    MalformedCommand(u32),
}

fn display_entity(entity: &Option<EntityId>) -> String {
    match entity {
        Some(id) => format!("{id:?}"),
        None => "an unplaced prototype".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::actor::{ActorBuilder, ActorParts};
    pub use crate::capability::{Ai, Attached, Consumable, Fighter};
    pub use crate::command::{ApplyReport, Command, CommandBuffer, CommandKind};
    pub use crate::container::{Container, MapId, Owner};
    pub use crate::entity::{Entity, EntityId, EntityKind, EntityMut};
    pub use crate::integrity::{IntegrityViolation, OwnershipEntry, OwnershipReport};
    pub use crate::inventory::Inventory;
    pub use crate::item::{ItemBuilder, ItemParts};
    pub use crate::map::GameMap;
    pub use crate::object::{PositionedObject, RenderOrder, Rgb};
    pub use crate::world::World;
    pub use crate::WorldError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
