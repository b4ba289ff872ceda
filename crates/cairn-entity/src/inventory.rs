//! Actor inventories.

use std::collections::HashSet;

use crate::container::Container;
use crate::entity::EntityId;

/// The carried items of one actor.
///
/// `capacity` is advisory: pickup rules consult [`is_full`](Self::is_full),
/// while [`Container::add`] keeps plain set semantics.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    capacity: usize,
    items: HashSet<EntityId>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: HashSet::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Empty the inventory, returning what it held in handle order.
    pub(crate) fn take_all(&mut self) -> Vec<EntityId> {
        let mut items: Vec<EntityId> = self.items.drain().collect();
        items.sort();
        items
    }
}

impl Container for Inventory {
    fn members(&self) -> &HashSet<EntityId> {
        &self.items
    }

    fn add(&mut self, entity: EntityId) -> bool {
        self.items.insert(entity)
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        self.items.remove(&entity)
    }
}
