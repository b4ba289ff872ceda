//! Actors: entities composed with AI, combat stats and an inventory.

use crate::capability::{Ai, Attached, Fighter};
use crate::entity::{Entity, EntityId, EntityKind};
use crate::inventory::Inventory;
use crate::object::{PositionedObject, RenderOrder, Rgb};
use crate::WorldError;

/// The capabilities an actor owns exclusively.
///
/// An actor is alive exactly as long as it has an AI; [`kill`](Self::kill)
/// clears the AI and leaves everything else in place.
#[derive(Debug, Clone)]
pub struct ActorParts {
    ai: Option<Attached<Box<dyn Ai>>>,
    fighter: Attached<Fighter>,
    inventory: Attached<Inventory>,
}

impl ActorParts {
    pub fn is_alive(&self) -> bool {
        self.ai.is_some()
    }

    pub fn ai(&self) -> Option<&Attached<Box<dyn Ai>>> {
        self.ai.as_ref()
    }

    pub fn ai_mut(&mut self) -> Option<&mut Box<dyn Ai>> {
        self.ai.as_mut().map(Attached::get_mut)
    }

    /// Clear the AI, returning it. The actor stays where it is.
    pub fn kill(&mut self) -> Option<Box<dyn Ai>> {
        self.ai.take().map(Attached::into_inner)
    }

    pub fn fighter(&self) -> &Attached<Fighter> {
        &self.fighter
    }

    pub fn fighter_mut(&mut self) -> &mut Fighter {
        self.fighter.get_mut()
    }

    /// The inventory. Its contents change only through
    /// [`World`](crate::world::World) so that item parents stay in step.
    pub fn inventory(&self) -> &Attached<Inventory> {
        &self.inventory
    }

    pub(crate) fn inventory_mut(&mut self) -> &mut Inventory {
        self.inventory.get_mut()
    }

    pub(crate) fn bind(&mut self, id: EntityId) {
        if let Some(ai) = &mut self.ai {
            ai.bind(id);
        }
        self.fighter.bind(id);
        self.inventory.bind(id);
    }

    pub(crate) fn unbind(&mut self) {
        if let Some(ai) = &mut self.ai {
            ai.unbind();
        }
        self.fighter.unbind();
        self.inventory.unbind();
        self.inventory.get_mut().take_all();
    }
}

/// Builds an unplaced actor prototype.
///
/// Actors always block movement and render with [`RenderOrder::Actor`].
///
/// ```
/// use cairn_entity::prelude::*;
/// # #[derive(Debug, Clone)] struct Hostile;
/// # impl Ai for Hostile {
/// #     fn label(&self) -> &str { "hostile" }
/// #     fn as_any(&self) -> &dyn std::any::Any { self }
/// #     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
/// # }
/// let orc = ActorBuilder::new('o', Rgb(63, 127, 63), "Orc")
///     .ai_with(|| Box::new(Hostile))
///     .fighter(Fighter::new(10, 0, 3))
///     .inventory(Inventory::new(0))
///     .build()
///     .unwrap();
/// assert!(orc.is_alive());
/// assert!(orc.object.blocks_movement);
/// ```
#[derive(Debug)]
pub struct ActorBuilder {
    object: PositionedObject,
    ai: Option<Box<dyn Ai>>,
    fighter: Option<Fighter>,
    inventory: Option<Inventory>,
}

impl ActorBuilder {
    pub fn new(glyph: char, color: Rgb, name: impl Into<String>) -> Self {
        Self {
            object: PositionedObject::new(glyph, color, name)
                .blocking(true)
                .with_render_order(RenderOrder::Actor),
            ai: None,
            fighter: None,
            inventory: None,
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.object = self.object.at(x, y);
        self
    }

    /// Instantiate the AI from a factory.
    pub fn ai_with<F>(mut self, factory: F) -> Self
    where
        F: FnOnce() -> Box<dyn Ai>,
    {
        self.ai = Some(factory());
        self
    }

    pub fn ai<A: Ai + Clone + 'static>(self, ai: A) -> Self {
        self.ai_with(|| Box::new(ai))
    }

    pub fn fighter(mut self, fighter: Fighter) -> Self {
        self.fighter = Some(fighter);
        self
    }

    pub fn inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// # Errors
    ///
    /// [`WorldError::MissingCapability`] if the AI, fighter or inventory was
    /// never supplied.
    pub fn build(self) -> Result<Entity, WorldError> {
        let missing = |capability: &'static str| WorldError::MissingCapability {
            kind: "actor",
            capability,
        };
        let ai = self.ai.ok_or_else(|| missing("ai"))?;
        let fighter = self.fighter.ok_or_else(|| missing("fighter"))?;
        let mut inventory = self.inventory.ok_or_else(|| missing("inventory"))?;
        inventory.take_all();

        let parts = ActorParts {
            ai: Some(Attached::new(ai)),
            fighter: Attached::new(fighter),
            inventory: Attached::new(inventory),
        };
        Ok(Entity::with_kind(self.object, EntityKind::Actor(parts)))
    }
}
