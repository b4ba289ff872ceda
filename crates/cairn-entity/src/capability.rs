//! Capability objects attached to actors and items.
//!
//! The entity model owns capabilities exclusively and hands each one a
//! non-owning back-reference to its holder through [`Attached`]. What a
//! capability *does* (choosing moves, resolving attacks, drinking a potion)
//! lives with the game rules; this module only fixes the shapes the model
//! needs to hold, clone and re-bind them.

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// Attached
// ---------------------------------------------------------------------------

/// A capability plus the handle of the entity that owns it.
///
/// The back-reference is `None` while the holder is an unplaced prototype
/// and is re-pointed every time the holder is spawned, so a clone's
/// capabilities never refer to the original.
#[derive(Debug, Clone)]
pub struct Attached<T> {
    parent: Option<EntityId>,
    inner: T,
}

impl<T> Attached<T> {
    pub fn new(inner: T) -> Self {
        Self {
            parent: None,
            inner,
        }
    }

    /// The entity holding this capability.
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn get(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub(crate) fn bind(&mut self, parent: EntityId) {
        self.parent = Some(parent);
    }

    pub(crate) fn unbind(&mut self) {
        self.parent = None;
    }
}

impl<T> Deref for Attached<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for Attached<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

// ---------------------------------------------------------------------------
// Ai
// ---------------------------------------------------------------------------

/// A behavior strategy driving an actor.
///
/// Implementors only need `Debug + Clone`; [`AiClone`] is provided by a
/// blanket impl so boxed strategies deep-clone with their actor.
pub trait Ai: AiClone + fmt::Debug {
    /// Short name of the strategy, for logs.
    fn label(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[doc(hidden)]
pub trait AiClone {
    fn clone_box(&self) -> Box<dyn Ai>;
}

impl<T: Ai + Clone + 'static> AiClone for T {
    fn clone_box(&self) -> Box<dyn Ai> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Ai> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

// ---------------------------------------------------------------------------
// Consumable
// ---------------------------------------------------------------------------

/// A usable effect carried by an item.
pub trait Consumable: ConsumableClone + fmt::Debug {
    fn label(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[doc(hidden)]
pub trait ConsumableClone {
    fn clone_box(&self) -> Box<dyn Consumable>;
}

impl<T: Consumable + Clone + 'static> ConsumableClone for T {
    fn clone_box(&self) -> Box<dyn Consumable> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Consumable> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

// ---------------------------------------------------------------------------
// Fighter
// ---------------------------------------------------------------------------

/// Combat statistics. Damage and healing rules live elsewhere; the only rule
/// kept here is that `hp` stays within `0..=max_hp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    max_hp: i32,
    hp: i32,
    pub defense: i32,
    pub power: i32,
}

impl Fighter {
    /// A fighter at full health.
    pub fn new(hp: i32, defense: i32, power: i32) -> Self {
        let max_hp = hp.max(0);
        Self {
            max_hp,
            hp: max_hp,
            defense,
            power,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn set_hp(&mut self, value: i32) {
        self.hp = value.clamp(0, self.max_hp);
    }
}
