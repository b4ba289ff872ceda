//! The [`World`] owns every live entity and every map.
//!
//! Entities live in an arena keyed by generational [`EntityId`]. Containers
//! hold handles only; the record behind a handle is dropped exactly when the
//! entity is despawned, which is the sole way an entity stops existing.
//!
//! All ownership changes go through the world so that the two halves of the
//! relationship (container membership and the entity's parent) never drift
//! apart: [`spawn`](World::spawn) and [`insert`](World::insert) register,
//! [`place`](World::place) transfers, [`despawn`](World::despawn)
//! unregisters.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::container::{Container, MapId, Owner};
use crate::entity::{Entity, EntityAllocator, EntityId, EntityKind, EntityMut};
use crate::map::GameMap;
use crate::WorldError;

/// Arena of entities and maps for one simulation.
#[derive(Default)]
pub struct World {
    allocator: EntityAllocator,
    pub(crate) entities: HashMap<EntityId, Entity>,
    pub(crate) maps: Vec<GameMap>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.entities.len())
            .field("map_count", &self.maps.len())
            .finish()
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // -- maps ---------------------------------------------------------------

    /// Register a new, empty map.
    pub fn add_map(&mut self, width: i32, height: i32) -> MapId {
        let id = MapId(self.maps.len() as u32);
        self.maps.push(GameMap::new(id, width, height));
        debug!(map = %id, width, height, "map added");
        id
    }

    pub fn map(&self, id: MapId) -> Option<&GameMap> {
        self.maps.get(id.index())
    }

    pub fn maps(&self) -> impl Iterator<Item = &GameMap> {
        self.maps.iter()
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    // -- lookup -------------------------------------------------------------

    /// Number of live entities, placed in maps or carried.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether `entity` names a live (not despawned) entity.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.allocator.is_live(entity) && self.entities.contains_key(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&Entity> {
        self.entities.get(&entity)
    }

    /// Mutable view of a record. The view reaches the object and the
    /// capability state only, never the parent or the inventory.
    pub fn get_mut(&mut self, entity: EntityId) -> Option<EntityMut<'_>> {
        self.entities
            .get_mut(&entity)
            .map(|record| EntityMut::new(entity, record))
    }

    /// Like [`get`](Self::get) but reports a stale handle as an error.
    pub fn entity(&self, entity: EntityId) -> Result<&Entity, WorldError> {
        self.entities
            .get(&entity)
            .ok_or(WorldError::StaleEntity(entity))
    }

    /// Like [`get_mut`](Self::get_mut) but reports a stale handle as an error.
    pub fn entity_mut(&mut self, entity: EntityId) -> Result<EntityMut<'_>, WorldError> {
        self.record_mut(entity)
            .map(|record| EntityMut::new(entity, record))
    }

    fn record_mut(&mut self, entity: EntityId) -> Result<&mut Entity, WorldError> {
        self.entities
            .get_mut(&entity)
            .ok_or(WorldError::StaleEntity(entity))
    }

    /// All live entities in handle order.
    pub fn entities(&self) -> Vec<(EntityId, &Entity)> {
        let mut all: Vec<_> = self.entities.iter().map(|(id, e)| (*id, e)).collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }

    /// The direct container of `entity`.
    pub fn parent(&self, entity: EntityId) -> Result<Option<Owner>, WorldError> {
        Ok(self.entity(entity)?.parent)
    }

    /// `true` for a live actor that still has its AI.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.get(entity).is_some_and(Entity::is_alive)
    }

    /// The members of `owner`.
    pub fn members(&self, owner: Owner) -> Result<&HashSet<EntityId>, WorldError> {
        Ok(self.container(owner)?.members())
    }

    /// Entities standing directly on `map` at `(x, y)`, in handle order.
    pub fn entities_at(&self, map: MapId, x: i32, y: i32) -> Result<Vec<EntityId>, WorldError> {
        let mut found: Vec<EntityId> = self
            .members(Owner::Map(map))?
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|e| e.position() == (x, y)))
            .collect();
        found.sort();
        Ok(found)
    }

    /// The movement-blocking entity on `map` at `(x, y)`, if any.
    pub fn blocking_entity_at(
        &self,
        map: MapId,
        x: i32,
        y: i32,
    ) -> Result<Option<EntityId>, WorldError> {
        Ok(self
            .entities_at(map, x, y)?
            .into_iter()
            .find(|id| self.get(*id).is_some_and(|e| e.object.blocks_movement)))
    }

    /// Resolve the map `entity` belongs to by walking its parent chain:
    /// a map parent is the answer, an inventory parent defers to the holder.
    ///
    /// # Errors
    ///
    /// - [`WorldError::StaleEntity`] if `entity` is not live.
    /// - [`WorldError::UnresolvedContainer`] if the chain ends without a map.
    pub fn gamemap(&self, entity: EntityId) -> Result<MapId, WorldError> {
        let unresolved = WorldError::UnresolvedContainer {
            entity: Some(entity),
        };
        let mut current = self.entity(entity)?;
        // A well-formed chain is at most one hop per live entity.
        for _ in 0..=self.entities.len() {
            match current.parent {
                None => return Err(unresolved),
                Some(Owner::Map(map)) => return Ok(map),
                Some(Owner::Inventory(holder)) => {
                    current = self.entities.get(&holder).ok_or(unresolved.clone())?;
                }
            }
        }
        Err(unresolved)
    }

    // -- registration -------------------------------------------------------

    /// Deep-clone `prototype` into `owner` at `(x, y)`.
    ///
    /// The clone gets a fresh handle and its capabilities' back-references
    /// point at that handle. The prototype is not modified and shares no
    /// state with the clone. Any inventory handles the prototype carries are
    /// not copied; use [`spawn_from`](Self::spawn_from) to clone a live actor
    /// together with its items.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownMap`], [`WorldError::StaleEntity`] or
    /// [`WorldError::NotAContainer`] if `owner` does not exist. Nothing is
    /// registered on error.
    pub fn spawn(
        &mut self,
        prototype: &Entity,
        owner: Owner,
        x: i32,
        y: i32,
    ) -> Result<EntityId, WorldError> {
        let mut clone = prototype.clone();
        clone.object.set_position(x, y);
        let id = self.register(clone, owner)?;
        debug!(entity = %id, name = %prototype.name(), %owner, x, y, "spawned");
        Ok(id)
    }

    /// Deep-clone the live entity `source` into `owner` at `(x, y)`.
    ///
    /// For actors everything they carry is cloned as well, recursively, and
    /// lands in the clone's inventory at its current coordinates. The
    /// carried tree is captured before anything is spawned, so cloning an
    /// actor into an inventory it (indirectly) holds copies the tree once.
    pub fn spawn_from(
        &mut self,
        source: EntityId,
        owner: Owner,
        x: i32,
        y: i32,
    ) -> Result<EntityId, WorldError> {
        // (template, index of the template's holder in `plan`)
        let mut plan: Vec<(Entity, Option<usize>)> = vec![(self.entity(source)?.clone(), None)];
        let mut next = 0;
        while next < plan.len() {
            let mut carried: Vec<EntityId> = plan[next]
                .0
                .actor()
                .map(|parts| parts.inventory().entities().copied().collect())
                .unwrap_or_default();
            carried.sort();
            for item in carried {
                plan.push((self.entity(item)?.clone(), Some(next)));
            }
            next += 1;
        }

        let mut spawned: Vec<EntityId> = Vec::with_capacity(plan.len());
        for (template, holder) in &plan {
            let id = match holder {
                None => self.spawn(template, owner, x, y)?,
                Some(h) => {
                    let (ix, iy) = template.position();
                    self.spawn(template, Owner::Inventory(spawned[*h]), ix, iy)?
                }
            };
            spawned.push(id);
        }
        Ok(spawned[0])
    }

    /// Register an already-built entity in `owner`, keeping its position.
    ///
    /// Unlike [`spawn`](Self::spawn) this moves the value in instead of
    /// cloning it.
    pub fn insert(&mut self, entity: Entity, owner: Owner) -> Result<EntityId, WorldError> {
        let name = entity.name().to_owned();
        let id = self.register(entity, owner)?;
        debug!(entity = %id, %name, %owner, "inserted");
        Ok(id)
    }

    fn register(&mut self, mut entity: Entity, owner: Owner) -> Result<EntityId, WorldError> {
        self.container(owner)?;
        entity.detach();

        let id = self.allocator.allocate();
        entity.bind(id);
        entity.parent = Some(owner);
        if let Err(e) = self.container_mut(owner).map(|c| c.add(id)) {
            self.allocator.release(id);
            return Err(e);
        }
        self.entities.insert(id, entity);
        Ok(id)
    }

    // -- relocation ---------------------------------------------------------

    /// Move `entity` to `(x, y)`, optionally transferring it to `owner`.
    ///
    /// With a new owner the entity is removed from its current container,
    /// whether that is a map or an inventory, before being added to the new
    /// one, so it is never listed twice. Without one only the position
    /// changes.
    ///
    /// # Errors
    ///
    /// Validation happens before anything is mutated:
    /// - [`WorldError::StaleEntity`] if `entity` is not live.
    /// - [`WorldError::UnknownMap`] / [`WorldError::NotAContainer`] /
    ///   [`WorldError::StaleEntity`] for a missing target container.
    /// - [`WorldError::OwnershipCycle`] if the target is `entity`'s own
    ///   inventory or an inventory carried, directly or not, by `entity`.
    pub fn place(
        &mut self,
        entity: EntityId,
        x: i32,
        y: i32,
        owner: Option<Owner>,
    ) -> Result<(), WorldError> {
        let old_owner = self.entity(entity)?.parent;

        if let Some(new_owner) = owner {
            self.container(new_owner)?;
            if self.owner_chain_contains(new_owner, entity) {
                return Err(WorldError::OwnershipCycle {
                    entity,
                    owner: new_owner,
                });
            }

            if let Some(old) = old_owner {
                match self.container_mut(old) {
                    Ok(container) => {
                        if !container.remove(entity) {
                            warn!(%entity, owner = %old, "entity was not listed by its parent container");
                        }
                    }
                    Err(e) => {
                        warn!(%entity, owner = %old, error = %e, "parent container is gone");
                    }
                }
            }
            self.container_mut(new_owner)?.add(entity);
            self.record_mut(entity)?.parent = Some(new_owner);
            debug!(%entity, from = ?old_owner, to = %new_owner, x, y, "placed");
        }

        self.record_mut(entity)?.object.set_position(x, y);
        Ok(())
    }

    /// Offset the position of `entity`. Ownership is untouched.
    pub fn move_by(&mut self, entity: EntityId, dx: i32, dy: i32) -> Result<(), WorldError> {
        self.record_mut(entity)?.object.translate(dx, dy);
        Ok(())
    }

    // -- removal ------------------------------------------------------------

    /// Unregister `entity` from its container and hand back its record.
    ///
    /// The handle goes stale. Items in an actor's inventory are despawned
    /// with it. The returned record is detached (no parent, unbound
    /// capabilities, empty inventory) and can be reused as a prototype; if
    /// the caller drops it, the entity is gone.
    pub fn despawn(&mut self, entity: EntityId) -> Result<Entity, WorldError> {
        let mut record = self
            .entities
            .remove(&entity)
            .ok_or(WorldError::StaleEntity(entity))?;
        self.allocator.release(entity);

        if let Some(owner) = record.parent {
            if let Ok(container) = self.container_mut(owner) {
                container.remove(entity);
            }
        }

        if let EntityKind::Actor(parts) = &mut record.kind {
            for carried in parts.inventory_mut().take_all() {
                if let Err(e) = self.despawn(carried) {
                    warn!(%entity, %carried, error = %e, "carried entity was already gone");
                }
            }
        }

        record.detach();
        debug!(%entity, name = %record.name(), "despawned");
        Ok(record)
    }

    /// Strict removal: despawn `entity` only if `owner` lists it.
    ///
    /// # Errors
    ///
    /// [`WorldError::NotAMember`] if `owner` does not hold `entity`.
    pub fn remove_from(&mut self, owner: Owner, entity: EntityId) -> Result<Entity, WorldError> {
        if !self.container(owner)?.contains(entity) {
            return Err(WorldError::NotAMember { entity, owner });
        }
        self.despawn(entity)
    }

    /// Clear the AI of an actor. Returns whether it was alive before.
    pub fn kill(&mut self, entity: EntityId) -> Result<bool, WorldError> {
        let parts = self
            .record_mut(entity)?
            .actor_mut()
            .ok_or(WorldError::NotAnActor(entity))?;
        let was_alive = parts.kill().is_some();
        if was_alive {
            debug!(%entity, "killed");
        }
        Ok(was_alive)
    }

    // -- container plumbing -------------------------------------------------

    pub fn container(&self, owner: Owner) -> Result<&dyn Container, WorldError> {
        match owner {
            Owner::Map(map) => self
                .maps
                .get(map.index())
                .map(|m| m as &dyn Container)
                .ok_or(WorldError::UnknownMap(map)),
            Owner::Inventory(holder) => {
                let parts = self
                    .entity(holder)?
                    .actor()
                    .ok_or(WorldError::NotAContainer(holder))?;
                Ok(parts.inventory().get() as &dyn Container)
            }
        }
    }

    fn container_mut(&mut self, owner: Owner) -> Result<&mut dyn Container, WorldError> {
        match owner {
            Owner::Map(map) => self
                .maps
                .get_mut(map.index())
                .map(|m| m as &mut dyn Container)
                .ok_or(WorldError::UnknownMap(map)),
            Owner::Inventory(holder) => {
                let parts = self
                    .record_mut(holder)?
                    .actor_mut()
                    .ok_or(WorldError::NotAContainer(holder))?;
                Ok(parts.inventory_mut() as &mut dyn Container)
            }
        }
    }

    /// Whether `entity` appears on the holder chain starting at `owner`.
    fn owner_chain_contains(&self, owner: Owner, entity: EntityId) -> bool {
        let mut current = owner;
        for _ in 0..=self.entities.len() {
            match current {
                Owner::Map(_) => return false,
                Owner::Inventory(holder) if holder == entity => return true,
                Owner::Inventory(holder) => {
                    match self.entities.get(&holder).and_then(Entity::parent) {
                        Some(next) => current = next,
                        None => return false,
                    }
                }
            }
        }
        // Longer than the number of entities: the chain already loops.
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use std::any::Any;

    #[derive(Debug, Clone)]
    struct Wander {
        steps: u32,
    }

    impl Ai for Wander {
        fn label(&self) -> &str {
            "wander"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Debug, Clone)]
    struct Heal(i32);

    impl Consumable for Heal {
        fn label(&self) -> &str {
            "heal"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn goblin() -> Entity {
        ActorBuilder::new('g', Rgb(63, 127, 63), "Goblin")
            .ai(Wander { steps: 0 })
            .fighter(Fighter::new(10, 0, 3))
            .inventory(Inventory::new(2))
            .build()
            .unwrap()
    }

    fn potion() -> Entity {
        ItemBuilder::new('!', Rgb(127, 0, 255), "Health Potion")
            .consumable(Heal(4))
            .build()
            .unwrap()
    }

    #[test]
    fn spawn_registers_clone_at_position() {
        let mut world = World::new();
        let map = world.add_map(40, 20);
        let proto = goblin();

        let g = world.spawn(&proto, Owner::Map(map), 5, 7).unwrap();

        let live = world.entity(g).unwrap();
        assert_eq!(live.position(), (5, 7));
        assert_eq!(live.parent(), Some(Owner::Map(map)));
        assert!(world.members(Owner::Map(map)).unwrap().contains(&g));
        assert_eq!(world.gamemap(g), Ok(map));
        assert!(world.is_alive(g));
        // The prototype stays unplaced and unbound.
        assert_eq!(proto.parent(), None);
        assert_eq!(proto.position(), (0, 0));
        assert_eq!(proto.actor().unwrap().fighter().parent(), None);
    }

    #[test]
    fn spawned_capabilities_point_at_the_clone() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let proto = goblin();
        let a = world.spawn(&proto, Owner::Map(map), 1, 1).unwrap();
        let b = world.spawn(&proto, Owner::Map(map), 2, 2).unwrap();

        for id in [a, b] {
            let parts = world.entity(id).unwrap().actor().unwrap();
            assert_eq!(parts.ai().unwrap().parent(), Some(id));
            assert_eq!(parts.fighter().parent(), Some(id));
            assert_eq!(parts.inventory().parent(), Some(id));
        }
    }

    #[test]
    fn clones_share_no_state() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let proto = goblin();
        let a = world.spawn(&proto, Owner::Map(map), 1, 1).unwrap();
        let b = world.spawn_from(a, Owner::Map(map), 2, 2).unwrap();

        {
            let mut rec = world.entity_mut(b).unwrap();
            rec.object_mut().name = "Goblin chief".to_owned();
            rec.fighter_mut().unwrap().set_hp(3);
            let ai = rec.ai_mut().unwrap();
            ai.as_any_mut().downcast_mut::<Wander>().unwrap().steps = 9;
        }

        let original = world.entity(a).unwrap();
        assert_eq!(original.name(), "Goblin");
        let parts = original.actor().unwrap();
        assert_eq!(parts.fighter().hp(), 10);
        let wander = parts.ai().unwrap().as_any().downcast_ref::<Wander>().unwrap();
        assert_eq!(wander.steps, 0);
        assert_eq!(proto.actor().unwrap().fighter().hp(), 10);
    }

    #[test]
    fn pick_up_and_drop_round_trip() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let player = world.spawn(&goblin(), Owner::Map(map), 3, 3).unwrap();
        let item = world.spawn(&potion(), Owner::Map(map), 3, 3).unwrap();
        let bag = Owner::Inventory(player);

        world.place(item, 3, 3, Some(bag)).unwrap();
        assert!(world.members(bag).unwrap().contains(&item));
        assert!(!world.members(Owner::Map(map)).unwrap().contains(&item));
        assert_eq!(world.gamemap(item), Ok(map));

        // Dropping removes it from the inventory, not just the map.
        world.place(item, 4, 3, Some(Owner::Map(map))).unwrap();
        assert!(!world.members(bag).unwrap().contains(&item));
        assert!(world.members(Owner::Map(map)).unwrap().contains(&item));
        assert_eq!(world.entity(item).unwrap().position(), (4, 3));
        assert!(world.check_integrity().is_empty());
    }

    #[test]
    fn place_without_owner_only_moves() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let g = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        world.place(g, 8, 9, None).unwrap();
        assert_eq!(world.entity(g).unwrap().position(), (8, 9));
        assert_eq!(world.parent(g), Ok(Some(Owner::Map(map))));
    }

    #[test]
    fn move_by_keeps_membership() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let g = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        let before = world.members(Owner::Map(map)).unwrap().clone();
        world.move_by(g, 2, -1).unwrap();
        assert_eq!(world.entity(g).unwrap().position(), (3, 0));
        assert_eq!(world.members(Owner::Map(map)).unwrap(), &before);
    }

    #[test]
    fn place_rejects_bad_targets_without_mutating() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let g = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        let p = world.spawn(&potion(), Owner::Map(map), 1, 1).unwrap();

        assert_eq!(
            world.place(g, 5, 5, Some(Owner::Map(MapId(7)))),
            Err(WorldError::UnknownMap(MapId(7)))
        );
        assert_eq!(
            world.place(g, 5, 5, Some(Owner::Inventory(p))),
            Err(WorldError::NotAContainer(p))
        );
        assert_eq!(
            world.place(g, 5, 5, Some(Owner::Inventory(g))),
            Err(WorldError::OwnershipCycle {
                entity: g,
                owner: Owner::Inventory(g)
            })
        );
        assert_eq!(world.entity(g).unwrap().position(), (1, 1));
        assert_eq!(world.parent(g), Ok(Some(Owner::Map(map))));
    }

    #[test]
    fn nested_inventory_cycle_is_rejected() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let outer = world.spawn(&goblin(), Owner::Map(map), 0, 0).unwrap();
        let inner = world.spawn(&goblin(), Owner::Map(map), 0, 0).unwrap();
        world.place(inner, 0, 0, Some(Owner::Inventory(outer))).unwrap();
        assert_eq!(world.gamemap(inner), Ok(map));

        let err = world
            .place(outer, 0, 0, Some(Owner::Inventory(inner)))
            .unwrap_err();
        assert!(matches!(err, WorldError::OwnershipCycle { .. }));
    }

    #[test]
    fn despawn_drops_carried_items_and_stales_handles() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let g = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        let item = world.spawn(&potion(), Owner::Inventory(g), 0, 0).unwrap();

        let record = world.despawn(g).unwrap();
        assert_eq!(record.parent(), None);
        assert!(record.actor().unwrap().inventory().is_empty());
        assert!(!world.contains(g));
        assert!(!world.contains(item));
        assert!(world.members(Owner::Map(map)).unwrap().is_empty());
        assert_eq!(world.despawn(g).unwrap_err(), WorldError::StaleEntity(g));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn despawn_skips_stale_carried_handles() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let g = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        let item = world.spawn(&potion(), Owner::Inventory(g), 0, 0).unwrap();
        let gone = world.spawn(&potion(), Owner::Map(map), 2, 2).unwrap();
        world.despawn(gone).unwrap();
        world
            .record_mut(g)
            .unwrap()
            .actor_mut()
            .unwrap()
            .inventory_mut()
            .add(gone);

        assert!(world.despawn(g).is_ok());
        assert!(!world.contains(item));
        assert_eq!(world.entity_count(), 0);
        assert!(world.members(Owner::Map(map)).unwrap().is_empty());
    }

    #[test]
    fn despawned_record_respawns_as_prototype() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let g = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        let record = world.despawn(g).unwrap();
        let again = world.insert(record, Owner::Map(map)).unwrap();
        assert_ne!(again, g);
        assert_eq!(again.index(), g.index());
        assert_eq!(world.entity(again).unwrap().position(), (1, 1));
        assert!(world.check_integrity().is_empty());
    }

    #[test]
    fn strict_removal_reports_non_members() {
        let mut world = World::new();
        let a = world.add_map(10, 10);
        let b = world.add_map(10, 10);
        let p = world.spawn(&potion(), Owner::Map(a), 1, 1).unwrap();
        assert_eq!(
            world.remove_from(Owner::Map(b), p).unwrap_err(),
            WorldError::NotAMember {
                entity: p,
                owner: Owner::Map(b)
            }
        );
        assert!(world.contains(p));
        assert!(world.remove_from(Owner::Map(a), p).is_ok());
        assert!(!world.contains(p));
    }

    #[test]
    fn kill_clears_alive_flag() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let g = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        let p = world.spawn(&potion(), Owner::Map(map), 1, 1).unwrap();
        assert_eq!(world.kill(g), Ok(true));
        assert!(!world.is_alive(g));
        assert_eq!(world.kill(g), Ok(false));
        assert_eq!(world.kill(p), Err(WorldError::NotAnActor(p)));
        // Corpses stay where they fell.
        assert!(world.contains(g));
    }

    #[test]
    fn spawn_from_clones_inventory_contents() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let g = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        let item = world.spawn(&potion(), Owner::Inventory(g), 0, 0).unwrap();

        let twin = world.spawn_from(g, Owner::Map(map), 2, 2).unwrap();
        let carried: Vec<EntityId> = world
            .members(Owner::Inventory(twin))
            .unwrap()
            .iter()
            .copied()
            .collect();
        assert_eq!(carried.len(), 1);
        assert_ne!(carried[0], item);
        assert_eq!(world.parent(carried[0]), Ok(Some(Owner::Inventory(twin))));
        assert_eq!(world.members(Owner::Inventory(g)).unwrap().len(), 1);
        assert!(world.check_integrity().is_empty());
    }

    #[test]
    fn spawn_from_into_own_subtree_copies_once() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let outer = world.spawn(&goblin(), Owner::Map(map), 1, 1).unwrap();
        let inner = world.spawn(&goblin(), Owner::Inventory(outer), 0, 0).unwrap();
        world.spawn(&potion(), Owner::Inventory(inner), 0, 0).unwrap();
        assert_eq!(world.entity_count(), 3);

        let twin = world.spawn_from(outer, Owner::Inventory(inner), 0, 0).unwrap();
        assert_eq!(world.entity_count(), 6);
        assert_eq!(world.gamemap(twin), Ok(map));
        assert!(world.check_integrity().is_empty());
    }

    #[test]
    fn blocking_lookup_ignores_items() {
        let mut world = World::new();
        let map = world.add_map(10, 10);
        let p = world.spawn(&potion(), Owner::Map(map), 4, 4).unwrap();
        assert_eq!(world.blocking_entity_at(map, 4, 4), Ok(None));
        let g = world.spawn(&goblin(), Owner::Map(map), 4, 4).unwrap();
        assert_eq!(world.blocking_entity_at(map, 4, 4), Ok(Some(g)));
        let mut here = vec![p, g];
        here.sort();
        assert_eq!(world.entities_at(map, 4, 4), Ok(here));
    }

    #[test]
    fn spawn_into_missing_container_registers_nothing() {
        let mut world = World::new();
        let err = world
            .spawn(&potion(), Owner::Map(MapId(0)), 0, 0)
            .unwrap_err();
        assert_eq!(err, WorldError::UnknownMap(MapId(0)));
        assert_eq!(world.entity_count(), 0);
    }
}
