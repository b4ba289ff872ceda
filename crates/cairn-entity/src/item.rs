//! Items: entities composed with a consumable effect.

use crate::capability::{Attached, Consumable};
use crate::entity::{Entity, EntityId, EntityKind};
use crate::object::{PositionedObject, RenderOrder, Rgb};
use crate::WorldError;

#[derive(Debug, Clone)]
pub struct ItemParts {
    consumable: Attached<Box<dyn Consumable>>,
}

impl ItemParts {
    pub fn consumable(&self) -> &Attached<Box<dyn Consumable>> {
        &self.consumable
    }

    pub fn consumable_mut(&mut self) -> &mut Box<dyn Consumable> {
        self.consumable.get_mut()
    }

    pub(crate) fn bind(&mut self, id: EntityId) {
        self.consumable.bind(id);
    }

    pub(crate) fn unbind(&mut self) {
        self.consumable.unbind();
    }
}

/// Builds an unplaced item prototype.
///
/// Items never block movement and always render with
/// [`RenderOrder::Item`]; neither is configurable.
#[derive(Debug)]
pub struct ItemBuilder {
    object: PositionedObject,
    consumable: Option<Box<dyn Consumable>>,
}

impl ItemBuilder {
    pub fn new(glyph: char, color: Rgb, name: impl Into<String>) -> Self {
        Self {
            object: PositionedObject::new(glyph, color, name)
                .blocking(false)
                .with_render_order(RenderOrder::Item),
            consumable: None,
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.object = self.object.at(x, y);
        self
    }

    pub fn consumable<C: Consumable + Clone + 'static>(mut self, consumable: C) -> Self {
        self.consumable = Some(Box::new(consumable));
        self
    }

    /// # Errors
    ///
    /// [`WorldError::MissingCapability`] without a consumable.
    pub fn build(self) -> Result<Entity, WorldError> {
        let consumable = self
            .consumable
            .ok_or(WorldError::MissingCapability {
                kind: "item",
                capability: "consumable",
            })?;
        let parts = ItemParts {
            consumable: Attached::new(consumable),
        };
        Ok(Entity::with_kind(self.object, EntityKind::Item(parts)))
    }
}
