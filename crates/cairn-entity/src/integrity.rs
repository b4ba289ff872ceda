//! Ownership integrity checks and a serializable ownership report.
//!
//! [`World::check_integrity`] cross-checks both halves of every ownership
//! relation: each container member must be live and point back at that
//! container, and each live entity must be listed by its parent exactly
//! once. [`OwnershipReport`] is a deterministic, serializable view of who
//! owns what, used for state hashing and debugging.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::container::{Container, MapId, Owner};
use crate::entity::{EntityId, EntityKind};
use crate::world::World;

/// One broken ownership invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityViolation {
    /// A container lists a handle that is not live.
    #[error("{owner} lists stale entity {entity:?}")]
    DanglingMember { owner: Owner, entity: EntityId },

    /// A container lists an entity whose parent is some other container.
    #[error("{owner} lists {entity:?}, whose parent is {parent:?}")]
    ParentMismatch {
        owner: Owner,
        entity: EntityId,
        parent: Option<Owner>,
    },

    /// A live entity is not listed by its parent.
    #[error("{entity:?} is not listed by its parent {parent:?}")]
    Unlisted {
        entity: EntityId,
        parent: Option<Owner>,
    },

    /// A live entity is listed by more than one container.
    #[error("{entity:?} is listed by {count} containers")]
    DuplicateMembership { entity: EntityId, count: usize },

    /// A capability's back-reference names some other entity.
    #[error("capability '{capability}' of {entity:?} points at {points_at:?}")]
    BrokenBackReference {
        entity: EntityId,
        capability: &'static str,
        points_at: Option<EntityId>,
    },
}

/// Where one live entity is and who owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipEntry {
    pub entity: EntityId,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub owner: Option<Owner>,
    pub alive: bool,
}

/// Every live entity and its owner, sorted by handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipReport {
    pub map_count: usize,
    pub entries: Vec<OwnershipEntry>,
}

impl OwnershipReport {
    /// The entry for `entity`, if it is live.
    pub fn entry(&self, entity: EntityId) -> Option<&OwnershipEntry> {
        self.entries
            .binary_search_by_key(&entity, |e| e.entity)
            .ok()
            .map(|i| &self.entries[i])
    }
}

impl World {
    /// Collect every ownership violation. An empty vector means the world is
    /// consistent.
    pub fn check_integrity(&self) -> Vec<IntegrityViolation> {
        let mut violations = Vec::new();
        let mut listed: HashMap<EntityId, usize> = HashMap::new();

        let mut owners: Vec<Owner> = (0..self.maps.len())
            .map(|i| Owner::Map(MapId(i as u32)))
            .collect();
        owners.extend(
            self.entities()
                .into_iter()
                .filter(|(_, e)| e.actor().is_some())
                .map(|(id, _)| Owner::Inventory(id)),
        );

        for owner in owners {
            let Ok(container) = self.container(owner) else {
                continue;
            };
            let mut members: Vec<EntityId> = container.entities().copied().collect();
            members.sort();
            for entity in members {
                *listed.entry(entity).or_default() += 1;
                match self.get(entity) {
                    None => violations.push(IntegrityViolation::DanglingMember { owner, entity }),
                    Some(record) if record.parent() != Some(owner) => {
                        violations.push(IntegrityViolation::ParentMismatch {
                            owner,
                            entity,
                            parent: record.parent(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for (entity, record) in self.entities() {
            let in_parent = record
                .parent()
                .and_then(|owner| self.container(owner).ok())
                .is_some_and(|container| container.contains(entity));
            if !in_parent {
                violations.push(IntegrityViolation::Unlisted {
                    entity,
                    parent: record.parent(),
                });
            }
            let count = listed.get(&entity).copied().unwrap_or(0);
            if count > 1 {
                violations.push(IntegrityViolation::DuplicateMembership { entity, count });
            }

            let mut back_refs: Vec<(&'static str, Option<EntityId>)> = Vec::new();
            match record.kind() {
                EntityKind::Plain => {}
                EntityKind::Actor(parts) => {
                    if let Some(ai) = parts.ai() {
                        back_refs.push(("ai", ai.parent()));
                    }
                    back_refs.push(("fighter", parts.fighter().parent()));
                    back_refs.push(("inventory", parts.inventory().parent()));
                }
                EntityKind::Item(parts) => {
                    back_refs.push(("consumable", parts.consumable().parent()));
                }
            }
            for (capability, points_at) in back_refs {
                if points_at != Some(entity) {
                    violations.push(IntegrityViolation::BrokenBackReference {
                        entity,
                        capability,
                        points_at,
                    });
                }
            }
        }

        violations
    }

    /// Deterministic view of every live entity and its owner.
    pub fn ownership_report(&self) -> OwnershipReport {
        let entries = self
            .entities()
            .into_iter()
            .map(|(entity, record)| {
                let (x, y) = record.position();
                OwnershipEntry {
                    entity,
                    name: record.name().to_owned(),
                    x,
                    y,
                    owner: record.parent(),
                    alive: record.is_alive(),
                }
            })
            .collect();
        OwnershipReport {
            map_count: self.map_count(),
            entries,
        }
    }
}
