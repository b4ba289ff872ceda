//! Ownership containers.
//!
//! Every live entity is listed by exactly one container: a
//! [`GameMap`](crate::map::GameMap) or an actor's
//! [`Inventory`](crate::inventory::Inventory). The entity points back at that
//! container through an [`Owner`] tag, which is all the model needs to walk
//! from an item in a backpack to the map the backpack's holder stands on.

use serde::{Deserialize, Serialize};
use std::collections::hash_set;
use std::collections::HashSet;
use std::fmt;

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// MapId
// ---------------------------------------------------------------------------

/// Handle for a map registered in a [`World`](crate::world::World).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(pub(crate) u32);

impl MapId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapId({})", self.0)
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Owner
// ---------------------------------------------------------------------------

/// The container an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Directly on a map.
    Map(MapId),
    /// Inside the inventory of the given actor.
    Inventory(EntityId),
}

impl Owner {
    pub fn map(self) -> Option<MapId> {
        match self {
            Owner::Map(map) => Some(map),
            Owner::Inventory(_) => None,
        }
    }

    /// The actor whose inventory this is.
    pub fn holder(self) -> Option<EntityId> {
        match self {
            Owner::Map(_) => None,
            Owner::Inventory(holder) => Some(holder),
        }
    }
}

impl From<MapId> for Owner {
    fn from(map: MapId) -> Self {
        Owner::Map(map)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Map(map) => write!(f, "{map}"),
            Owner::Inventory(holder) => write!(f, "inventory of {holder}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// A set of entity handles with set semantics and no iteration order.
///
/// `add` and `remove` only touch the set. Keeping the entity's parent in
/// step is the job of [`World`](crate::world::World), which is why live
/// containers are only handed out by shared reference.
pub trait Container {
    fn members(&self) -> &HashSet<EntityId>;

    /// Insert `entity`. Returns `false` if it was already a member.
    fn add(&mut self, entity: EntityId) -> bool;

    /// Remove `entity`. Removing a non-member is a no-op that returns
    /// `false`; the strict variant is
    /// [`World::remove_from`](crate::world::World::remove_from).
    fn remove(&mut self, entity: EntityId) -> bool;

    fn contains(&self, entity: EntityId) -> bool {
        self.members().contains(&entity)
    }

    fn entities(&self) -> hash_set::Iter<'_, EntityId> {
        self.members().iter()
    }

    fn len(&self) -> usize {
        self.members().len()
    }

    fn is_empty(&self) -> bool {
        self.members().is_empty()
    }
}
