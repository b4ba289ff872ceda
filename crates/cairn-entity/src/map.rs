//! Spatial containers.

use std::collections::HashSet;

use crate::container::{Container, MapId};
use crate::entity::EntityId;

/// A rectangular map and the set of entities standing directly on it.
///
/// Entities inside an inventory on this map are not members; they reach the
/// map through their holder.
#[derive(Debug, Clone)]
pub struct GameMap {
    id: MapId,
    width: i32,
    height: i32,
    entities: HashSet<EntityId>,
}

impl GameMap {
    pub(crate) fn new(id: MapId, width: i32, height: i32) -> Self {
        Self {
            id,
            width,
            height,
            entities: HashSet::new(),
        }
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `(x, y)` lies inside the map.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }
}

impl Container for GameMap {
    fn members(&self) -> &HashSet<EntityId> {
        &self.entities
    }

    fn add(&mut self, entity: EntityId) -> bool {
        self.entities.insert(entity)
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_half_open() {
        let map = GameMap::new(MapId(0), 80, 45);
        assert!(map.in_bounds(0, 0));
        assert!(map.in_bounds(79, 44));
        assert!(!map.in_bounds(80, 10));
        assert!(!map.in_bounds(10, -1));
    }

    #[test]
    fn add_is_idempotent_and_remove_is_lenient() {
        let mut map = GameMap::new(MapId(0), 10, 10);
        let e = EntityId::new(1, 0);
        assert!(map.add(e));
        assert!(!map.add(e));
        assert_eq!(map.len(), 1);
        assert!(map.remove(e));
        assert!(!map.remove(e));
        assert!(map.is_empty());
    }
}
