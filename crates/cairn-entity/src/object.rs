//! Spatial and presentation attributes shared by every entity.

use serde::{Deserialize, Serialize};

/// An RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// Draw priority tag. The entity model carries it but never interprets it;
/// renderers sort ascending so actors are drawn over items over corpses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    Corpse,
    Item,
    Actor,
}

/// Identity, position and look of an entity. Carries no behavior.
///
/// Coordinates are integers; [`at_truncated`](Self::at_truncated) is the
/// only way fractional input enters and it truncates toward zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedObject {
    pub x: i32,
    pub y: i32,
    pub glyph: char,
    pub color: Rgb,
    pub name: String,
    pub blocks_movement: bool,
    pub render_order: RenderOrder,
}

impl Default for PositionedObject {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            glyph: '?',
            color: Rgb::WHITE,
            name: "<Unnamed>".to_owned(),
            blocks_movement: false,
            render_order: RenderOrder::Corpse,
        }
    }
}

impl PositionedObject {
    /// A non-blocking object at the origin with [`RenderOrder::Corpse`].
    pub fn new(glyph: char, color: Rgb, name: impl Into<String>) -> Self {
        Self {
            glyph,
            color,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.set_position(x, y);
        self
    }

    /// Like [`at`](Self::at) for fractional coordinates. Values are
    /// truncated toward zero and saturate at the `i32` range.
    pub fn at_truncated(self, x: f64, y: f64) -> Self {
        self.at(x as i32, y as i32)
    }

    pub fn blocking(mut self, blocks_movement: bool) -> Self {
        self.blocks_movement = blocks_movement;
        self
    }

    pub fn with_render_order(mut self, render_order: RenderOrder) -> Self {
        self.render_order = render_order;
        self
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub(crate) fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Offset the position, saturating at the `i32` bounds.
    pub(crate) fn translate(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }
}
