//! Entity handles, handle allocation, and the entity record.
//!
//! An [`EntityId`] names an arena slot together with the slot's generation.
//! Despawning bumps the generation, so a handle kept by a container, a
//! capability back-reference or a caller goes stale instead of silently
//! naming whatever entity later reuses the slot.
//!
//! An [`Entity`] is the record behind a handle: a [`PositionedObject`], the
//! container that currently owns it, and its composition ([`EntityKind`]).
//! Entity values that are not registered in a [`World`] act as prototypes.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;

use crate::actor::ActorParts;
use crate::capability::{Ai, Consumable, Fighter};
use crate::container::{MapId, Owner};
use crate::item::ItemParts;
use crate::object::PositionedObject;
use crate::world::World;
use crate::WorldError;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Handle to a live entity: a slot in the [`World`] arena plus the slot's
/// generation at the time the handle was issued.
///
/// Handles order by slot first, so sorting gives an order that does not
/// depend on hashing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Bumped every time the slot is released.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// `3v1` is slot 3, generation 1.
impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    generation: u32,
    live: bool,
}

/// Hands out [`EntityId`]s and recycles the slots of despawned entities.
///
/// Released slots are reused in FIFO order so generations spread over all
/// slots rather than piling up on one.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    free: VecDeque<u32>,
}

impl EntityAllocator {
    /// Create an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh handle, reusing a released slot when one is queued.
    pub fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free.pop_front() {
            let slot = &mut self.slots[index as usize];
            slot.live = true;
            return EntityId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            live: true,
        });
        EntityId::new(index, 0)
    }

    /// Release a handle and bump its slot's generation.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn release(&mut self, id: EntityId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        let slot = &mut self.slots[id.index() as usize];
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push_back(id.index());
        true
    }

    /// Whether `id` names a live slot at its current generation.
    pub fn is_live(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index() as usize)
            .is_some_and(|slot| slot.live && slot.generation == id.generation())
    }

    /// Number of live handles.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.live).count()
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// What an entity is composed of beyond its [`PositionedObject`].
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// Scenery, corpses and anything else without capabilities.
    Plain,
    /// An entity with AI, combat stats and an inventory.
    Actor(ActorParts),
    /// An entity with a consumable effect.
    Item(ItemParts),
}

/// A positioned object plus its owning container and capabilities.
///
/// Built unplaced (as a prototype) through [`Entity::new`],
/// [`ActorBuilder`](crate::actor::ActorBuilder) or
/// [`ItemBuilder`](crate::item::ItemBuilder). Live copies are created with
/// [`Entity::spawn`] and afterwards addressed through their [`EntityId`].
#[derive(Debug, Clone)]
pub struct Entity {
    /// Position and presentation. Mutating these fields never changes
    /// ownership.
    pub object: PositionedObject,
    pub(crate) parent: Option<Owner>,
    pub(crate) kind: EntityKind,
}

impl Entity {
    /// A plain, unplaced entity.
    pub fn new(object: PositionedObject) -> Self {
        Self::with_kind(object, EntityKind::Plain)
    }

    pub(crate) fn with_kind(object: PositionedObject, kind: EntityKind) -> Self {
        Self {
            object,
            parent: None,
            kind,
        }
    }

    /// The container that currently owns this entity, if any.
    pub fn parent(&self) -> Option<Owner> {
        self.parent
    }

    /// The map this entity belongs to, following inventories to their
    /// holder.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnresolvedContainer`] for an unplaced prototype.
    pub fn gamemap(&self, world: &World) -> Result<MapId, WorldError> {
        match self.parent {
            None => Err(WorldError::UnresolvedContainer { entity: None }),
            Some(Owner::Map(map)) => Ok(map),
            Some(Owner::Inventory(holder)) => world.gamemap(holder),
        }
    }

    /// Deep-clone this entity into `owner` at `(x, y)`.
    ///
    /// Shorthand for [`World::spawn`].
    pub fn spawn(
        &self,
        world: &mut World,
        owner: Owner,
        x: i32,
        y: i32,
    ) -> Result<EntityId, WorldError> {
        world.spawn(self, owner, x, y)
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn actor(&self) -> Option<&ActorParts> {
        match &self.kind {
            EntityKind::Actor(parts) => Some(parts),
            _ => None,
        }
    }

    pub(crate) fn actor_mut(&mut self) -> Option<&mut ActorParts> {
        match &mut self.kind {
            EntityKind::Actor(parts) => Some(parts),
            _ => None,
        }
    }

    pub fn item(&self) -> Option<&ItemParts> {
        match &self.kind {
            EntityKind::Item(parts) => Some(parts),
            _ => None,
        }
    }

    pub(crate) fn item_mut(&mut self) -> Option<&mut ItemParts> {
        match &mut self.kind {
            EntityKind::Item(parts) => Some(parts),
            _ => None,
        }
    }

    /// `true` for an actor that still has its AI. Never `true` for plain
    /// entities or items.
    pub fn is_alive(&self) -> bool {
        self.actor().is_some_and(ActorParts::is_alive)
    }

    pub fn name(&self) -> &str {
        &self.object.name
    }

    pub fn position(&self) -> (i32, i32) {
        self.object.position()
    }

    /// Point every capability back-reference at `id`.
    pub(crate) fn bind(&mut self, id: EntityId) {
        match &mut self.kind {
            EntityKind::Plain => {}
            EntityKind::Actor(parts) => parts.bind(id),
            EntityKind::Item(parts) => parts.bind(id),
        }
    }

    /// Strip every handle that only means something inside a world: the
    /// parent, the capability back-references, and inventory contents.
    pub(crate) fn detach(&mut self) {
        self.parent = None;
        match &mut self.kind {
            EntityKind::Plain => {}
            EntityKind::Actor(parts) => parts.unbind(),
            EntityKind::Item(parts) => parts.unbind(),
        }
    }
}

// ---------------------------------------------------------------------------
// EntityMut
// ---------------------------------------------------------------------------

/// Mutable access to a live entity's look and capability state.
///
/// Handed out by [`World::entity_mut`]. Everything that decides ownership
/// (the parent, inventory contents, capability back-references) stays out
/// of reach; it changes only through [`World`] operations. The view derefs
/// to `&Entity` for reading but cannot be assigned over:
///
/// ```compile_fail
/// use cairn_entity::prelude::*;
///
/// let mut world = World::new();
/// let map = world.add_map(4, 4);
/// let rock = Entity::new(PositionedObject::new('*', Rgb::WHITE, "Rock"));
/// let id = world.spawn(&rock, Owner::Map(map), 0, 0).unwrap();
/// *world.entity_mut(id).unwrap() = rock.clone();
/// ```
///
/// nor does it expose the actor's parts mutably:
///
/// ```compile_fail
/// use cairn_entity::prelude::*;
///
/// fn swap_parts(world: &mut World, a: EntityId, parts: ActorParts) {
///     *world.entity_mut(a).unwrap().actor_mut().unwrap() = parts;
/// }
/// ```
pub struct EntityMut<'w> {
    id: EntityId,
    record: &'w mut Entity,
}

impl<'w> EntityMut<'w> {
    pub(crate) fn new(id: EntityId, record: &'w mut Entity) -> Self {
        Self { id, record }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Name, glyph, color, blocking flag, render order and position.
    /// Position changes here are equivalent to [`World::place`] without a
    /// new owner.
    pub fn object_mut(&mut self) -> &mut PositionedObject {
        &mut self.record.object
    }

    pub fn fighter_mut(&mut self) -> Option<&mut Fighter> {
        self.record.actor_mut().map(ActorParts::fighter_mut)
    }

    /// The AI of a living actor.
    pub fn ai_mut(&mut self) -> Option<&mut Box<dyn Ai>> {
        self.record.actor_mut().and_then(ActorParts::ai_mut)
    }

    pub fn consumable_mut(&mut self) -> Option<&mut Box<dyn Consumable>> {
        self.record.item_mut().map(ItemParts::consumable_mut)
    }

    /// Clear the AI of an actor, returning it.
    pub fn kill(&mut self) -> Option<Box<dyn Ai>> {
        self.record.actor_mut().and_then(ActorParts::kill)
    }
}

impl Deref for EntityMut<'_> {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        self.record
    }
}

impl fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMut")
            .field("id", &self.id)
            .field("record", &self.record)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
